use eframe::egui;

use crate::engine::protocol::{EngineCommand, PlayerSetup};
use crate::engine::roles::max_mafia;
use crate::model::player::Gender;

use super::app::{MafiaApp, PlayerRow, Screen, SetupForm};

pub fn draw_setup_panel(ctx: &egui::Context, app: &mut MafiaApp) {
    egui::TopBottomPanel::bottom("setup_actions").show(ctx, |ui| {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            if ui.button("Back").clicked() {
                app.ui.screen = Screen::Home;
            }

            let ready = setup_ready(&app.ui.setup);
            if ui
                .add_enabled(ready, egui::Button::new("Start game"))
                .clicked()
            {
                let form = &app.ui.setup;
                let setup: Vec<PlayerSetup> = form
                    .rows
                    .iter()
                    .map(|r| PlayerSetup {
                        name: r.name.clone(),
                        gender: r.gender,
                    })
                    .collect();

                app.send_command(EngineCommand::StartGame {
                    setup,
                    mafia_count: form.num_mafia.unwrap_or(0),
                });
            }

            if let Some(err) = &app.ui.last_error {
                ui.colored_label(egui::Color32::LIGHT_RED, err);
            }
        });
        ui.add_space(4.0);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Game setup");
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            let form = &mut app.ui.setup;

            ui.label("Enter the number of players");
            egui::ComboBox::from_id_salt("num_players")
                .selected_text(match form.num_players {
                    Some(n) => n.to_string(),
                    None => "Select…".into(),
                })
                .show_ui(ui, |ui| {
                    for n in 2..=12 {
                        ui.selectable_value(&mut form.num_players, Some(n), n.to_string());
                    }
                });

            // Keep the row list in sync with the chosen player count and
            // drop a mafia count that no longer fits.
            let count = form.num_players.unwrap_or(0);
            if form.rows.len() != count {
                form.rows.resize_with(count, PlayerRow::default);
            }
            let cap = max_mafia(count);
            if form.num_mafia.map_or(false, |m| m > cap) {
                form.num_mafia = None;
            }

            ui.add_space(8.0);
            ui.label("Enter the number of Mafia");
            egui::ComboBox::from_id_salt("num_mafia")
                .selected_text(match form.num_mafia {
                    Some(m) => m.to_string(),
                    None => "Select…".into(),
                })
                .show_ui(ui, |ui| {
                    for m in 0..=cap {
                        ui.selectable_value(&mut form.num_mafia, Some(m), m.to_string());
                    }
                });

            for (idx, row) in form.rows.iter_mut().enumerate() {
                ui.add_space(12.0);
                ui.label(egui::RichText::new(format!("Player {}", idx + 1)).strong());

                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut row.name)
                            .hint_text("Name")
                            .desired_width(180.0),
                    );

                    egui::ComboBox::from_id_salt(("gender", idx))
                        .selected_text(row.gender.map_or("Gender", |g| g.label()))
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut row.gender, Some(Gender::Male), "Male");
                            ui.selectable_value(&mut row.gender, Some(Gender::Female), "Female");
                        });
                });
            }
        });
    });
}

fn setup_ready(form: &SetupForm) -> bool {
    form.num_players.map_or(false, |n| n >= 2)
        && form.num_mafia.is_some()
        && !form.rows.is_empty()
        && form
            .rows
            .iter()
            .all(|r| !r.name.trim().is_empty() && r.gender.is_some())
}
