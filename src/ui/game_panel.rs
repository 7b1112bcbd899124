use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::player::{PlayerId, Role, Target};
use crate::model::session::{Phase, Verdict};

use super::app::{draw_message, GameView, MafiaApp, Screen};

pub fn draw_game_panel(ctx: &egui::Context, app: &mut MafiaApp) {
    let mut command: Option<EngineCommand> = None;
    let mut abandon = false;

    {
        let Some(game) = app.ui.game.as_mut() else {
            app.ui.screen = Screen::Setup;
            return;
        };

        draw_roster_panel(ctx, game);
        draw_controls_panel(ctx, game, &mut command, &mut abandon);
        draw_log_panel(ctx, game, app.ui.last_error.as_deref());
    }

    if abandon {
        // Abandoning the session is the only way to walk away from an
        // in-flight narration request.
        app.ui.game = None;
        app.ui.screen = Screen::Home;
        app.ui.last_error = None;
        return;
    }

    if let Some(cmd) = command {
        app.send_command(cmd);
        if let Some(game) = app.ui.game.as_mut() {
            game.awaiting = true;
            game.can_retry = false;
        }
        app.ui.last_error = None;
    }
}

fn draw_roster_panel(ctx: &egui::Context, game: &GameView) {
    egui::SidePanel::right("roster")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading(format!("Round {} ({})", game.round, game.phase.label()));
            ui.separator();

            ui.label(egui::RichText::new("Alive").strong());
            for p in &game.roster {
                ui.label(format!("{} · {}", p.name, p.role.label()));
            }

            if !game.eliminated.is_empty() {
                ui.separator();
                ui.label(egui::RichText::new("Eliminated").strong());
                for p in &game.eliminated {
                    ui.label(
                        egui::RichText::new(format!("{} · {}", p.name, p.role.label()))
                            .strikethrough()
                            .color(egui::Color32::DARK_GRAY),
                    );
                }
            }
        });
}

fn draw_controls_panel(
    ctx: &egui::Context,
    game: &mut GameView,
    command: &mut Option<EngineCommand>,
    abandon: &mut bool,
) {
    // Owned option lists keep the combo closures free of roster borrows.
    let living: Vec<(PlayerId, String)> = game
        .roster
        .iter()
        .map(|p| (p.id, p.name.clone()))
        .collect();
    let kill_options: Vec<(PlayerId, String)> = game
        .roster
        .iter()
        .filter(|p| p.role != Role::Mafia)
        .map(|p| (p.id, p.name.clone()))
        .collect();
    let investigate_options: Vec<(PlayerId, String)> = game
        .roster
        .iter()
        .filter(|p| p.role != Role::Sheriff)
        .map(|p| (p.id, p.name.clone()))
        .collect();

    egui::TopBottomPanel::bottom("round_controls").show(ctx, |ui| {
        ui.add_space(6.0);

        if game.awaiting {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for the narrator…");
            });
            ui.add_space(6.0);
            return;
        }

        match game.phase {
            Phase::Night => {
                ui.horizontal(|ui| {
                    target_combo(
                        ui,
                        "kill_target",
                        "Mafia kills",
                        &mut game.kill_choice,
                        "No kill",
                        &kill_options,
                    );
                    player_combo(
                        ui,
                        "save_target",
                        "Doctor saves",
                        &mut game.save_choice,
                        &living,
                    );
                    player_combo(
                        ui,
                        "investigate_target",
                        "Sheriff investigates",
                        &mut game.investigate_choice,
                        &investigate_options,
                    );
                });

                let ready = game.kill_choice.is_some()
                    && game.save_choice.is_some()
                    && game.investigate_choice.is_some();

                ui.horizontal(|ui| {
                    let clicked = ui
                        .add_enabled(ready, egui::Button::new("End the night"))
                        .clicked();
                    if clicked {
                        if let (Some(killed), Some(saved), Some(investigated)) = (
                            game.kill_choice,
                            game.save_choice,
                            game.investigate_choice,
                        ) {
                            *command = Some(EngineCommand::CompleteNight {
                                killed,
                                saved,
                                investigated,
                            });
                        }
                    }
                    retry_and_abandon(ui, game, command, abandon);
                });
            }

            Phase::Vote => {
                ui.horizontal(|ui| {
                    target_combo(
                        ui,
                        "vote_target",
                        "Voted out",
                        &mut game.vote_choice,
                        "No one voted",
                        &living,
                    );

                    let clicked = ui
                        .add_enabled(
                            game.vote_choice.is_some(),
                            egui::Button::new("Close the vote"),
                        )
                        .clicked();
                    if clicked {
                        if let Some(voted) = game.vote_choice {
                            *command = Some(EngineCommand::CompleteVote { voted });
                        }
                    }
                    retry_and_abandon(ui, game, command, abandon);
                });
            }
        }

        ui.add_space(6.0);
    });
}

fn retry_and_abandon(
    ui: &mut egui::Ui,
    game: &GameView,
    command: &mut Option<EngineCommand>,
    abandon: &mut bool,
) {
    if game.can_retry && ui.button("Retry narration").clicked() {
        *command = Some(EngineCommand::RetryRound);
    }
    if ui.button("Abandon game").clicked() {
        *abandon = true;
    }
}

fn draw_log_panel(ctx: &egui::Context, game: &GameView, last_error: Option<&str>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        match game.verdict {
            Some(Verdict::TownWins) => {
                ui.colored_label(
                    egui::Color32::LIGHT_GREEN,
                    "The town has won: every mafioso is gone.",
                );
            }
            Some(Verdict::MafiaWins) => {
                ui.colored_label(
                    egui::Color32::LIGHT_RED,
                    "The mafia has won: the town is outnumbered.",
                );
            }
            None => {}
        }

        if let Some(err) = last_error {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for msg in &game.log {
                    draw_message(ui, msg);
                }
            });
    });
}

fn player_combo(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    choice: &mut Option<PlayerId>,
    options: &[(PlayerId, String)],
) {
    ui.vertical(|ui| {
        ui.label(label);
        let selected = choice
            .and_then(|id| options.iter().find(|(oid, _)| *oid == id))
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| "Select…".into());

        egui::ComboBox::from_id_salt(id_salt)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for (id, name) in options {
                    ui.selectable_value(choice, Some(*id), name.clone());
                }
            });
    });
}

fn target_combo(
    ui: &mut egui::Ui,
    id_salt: &str,
    label: &str,
    choice: &mut Option<Target>,
    nobody_label: &str,
    options: &[(PlayerId, String)],
) {
    ui.vertical(|ui| {
        ui.label(label);
        let selected = match choice {
            Some(Target::Nobody) => nobody_label.to_string(),
            Some(Target::Player(id)) => options
                .iter()
                .find(|(oid, _)| oid == id)
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| "Select…".into()),
            None => "Select…".into(),
        };

        egui::ComboBox::from_id_salt(id_salt)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(choice, Some(Target::Nobody), nobody_label);
                for (id, name) in options {
                    ui.selectable_value(choice, Some(Target::Player(*id)), name.clone());
                }
            });
    });
}
