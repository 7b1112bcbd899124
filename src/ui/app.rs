use eframe::egui;
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::engine::Engine;
use crate::engine::llm_client;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::model::message::Message;
use crate::model::player::{Gender, Player, PlayerId, Target};
use crate::model::session::{Phase, Verdict};
use crate::ui::settings::AppSettings;
use crate::ui::settings_io;
use crate::ui::{game_panel, setup_panel};

/* =========================
   Screens
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Setup,
    Game,
}

/* =========================
   Setup form state
   ========================= */

#[derive(Default)]
pub struct PlayerRow {
    pub name: String,
    pub gender: Option<Gender>,
}

#[derive(Default)]
pub struct SetupForm {
    pub num_players: Option<usize>,
    pub num_mafia: Option<usize>,
    pub rows: Vec<PlayerRow>,
}

/* =========================
   Game screen state
   ========================= */

pub struct GameView {
    pub roster: Vec<Player>,
    pub eliminated: Vec<Player>,
    pub round: u32,
    pub phase: Phase,
    pub log: Vec<Message>,

    pub kill_choice: Option<Target>,
    pub save_choice: Option<PlayerId>,
    pub investigate_choice: Option<PlayerId>,
    pub vote_choice: Option<Target>,

    pub awaiting: bool,
    pub can_retry: bool,
    pub verdict: Option<Verdict>,
}

impl GameView {
    fn new(roster: Vec<Player>) -> Self {
        Self {
            roster,
            eliminated: Vec::new(),
            round: 1,
            phase: Phase::Night,
            log: vec![Message::System("Round 1 (Night)".into())],
            kill_choice: None,
            save_choice: None,
            investigate_choice: None,
            vote_choice: None,
            awaiting: false,
            can_retry: false,
            verdict: None,
        }
    }

    fn clear_choices(&mut self) {
        self.kill_choice = None;
        self.save_choice = None;
        self.investigate_choice = None;
        self.vote_choice = None;
    }
}

/* =========================
   UI state
   ========================= */

pub struct UiState {
    pub screen: Screen,
    pub setup: SetupForm,
    pub game: Option<GameView>,
    pub last_error: Option<String>,
    pub show_settings: bool,
    pub connection_status: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Home,
            setup: SetupForm::default(),
            game: None,
            last_error: None,
            show_settings: false,
            connection_status: None,
        }
    }
}

/* =========================
   App
   ========================= */

pub struct MafiaApp {
    pub ui: UiState,
    pub settings: AppSettings,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl MafiaApp {
    pub fn new() -> Self {
        let settings = settings_io::load_settings();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let narrator = settings.narrator.clone();
        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, narrator);
            engine.run();
        });

        Self {
            ui: UiState::default(),
            settings,
            cmd_tx,
            resp_rx,
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::GameStarted { roster } => {
                    self.ui.game = Some(GameView::new(roster));
                    self.ui.screen = Screen::Game;
                    self.ui.last_error = None;
                }

                EngineResponse::RoundAdvanced {
                    narration,
                    roster,
                    round,
                    phase,
                    verdict,
                } => {
                    if let Some(game) = self.ui.game.as_mut() {
                        for p in &game.roster {
                            if !roster.iter().any(|q| q.id == p.id) {
                                game.eliminated.push(p.clone());
                            }
                        }

                        game.log.push(Message::Narration(narration));
                        game.log.push(Message::System(format!(
                            "Round {round} ({})",
                            phase.label()
                        )));

                        game.roster = roster;
                        game.round = round;
                        game.phase = phase;
                        game.verdict = verdict;
                        game.awaiting = false;
                        game.can_retry = false;
                        game.clear_choices();
                        self.ui.last_error = None;
                    }
                }

                EngineResponse::Rejected { reason } => {
                    self.ui.last_error = Some(reason);
                    if let Some(game) = self.ui.game.as_mut() {
                        game.awaiting = false;
                    }
                }

                EngineResponse::NarrationFailed { reason } => {
                    if let Some(game) = self.ui.game.as_mut() {
                        game.log.push(Message::System(format!(
                            "Narration failed: {reason}. The round is still pending."
                        )));
                        game.awaiting = false;
                        game.can_retry = true;
                    }
                }
            }
        }
    }

    fn draw_home(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(120.0);
                ui.label(egui::RichText::new("MAFIA").size(64.0).strong());
                ui.label("A narrated companion for game night");
                ui.add_space(32.0);

                if ui.button(egui::RichText::new("Play").size(24.0)).clicked() {
                    self.ui.screen = Screen::Setup;
                }

                ui.add_space(8.0);
                if ui.button("Settings").clicked() {
                    self.ui.show_settings = true;
                }
            });
        });
    }

    fn draw_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.ui.show_settings;

        egui::Window::new("Settings").open(&mut open).show(ctx, |ui| {
            ui.label("UI Scale");
            ui.add(egui::Slider::new(&mut self.settings.ui_scale, 0.75..=2.0));

            ui.separator();
            ui.label("Narrator endpoint");
            ui.text_edit_singleline(&mut self.settings.narrator.endpoint);

            ui.label("Model");
            ui.text_edit_singleline(&mut self.settings.narrator.model);

            ui.label("Temperature");
            ui.add(egui::Slider::new(
                &mut self.settings.narrator.temperature,
                0.0..=1.5,
            ));

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Test connection").clicked() {
                    self.ui.connection_status =
                        Some(match llm_client::test_connection(&self.settings.narrator.endpoint) {
                            Ok(status) => status,
                            Err(e) => format!("Failed: {e}"),
                        });
                }

                if ui.button("Save").clicked() {
                    settings_io::save_settings(&self.settings);
                    let _ = self
                        .cmd_tx
                        .send(EngineCommand::UpdateNarrator(self.settings.narrator.clone()));
                }
            });

            if let Some(status) = &self.ui.connection_status {
                ui.label(status.clone());
            }
        });

        self.ui.show_settings = open;
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MafiaApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        self.drain_responses();

        match self.ui.screen {
            Screen::Home => self.draw_home(ctx),
            Screen::Setup => setup_panel::draw_setup_panel(ctx, self),
            Screen::Game => game_panel::draw_game_panel(ctx, self),
        }

        if self.ui.show_settings {
            self.draw_settings_window(ctx);
        }

        // Keep polling while a narration request is in flight.
        let awaiting = self.ui.game.as_ref().map_or(false, |g| g.awaiting);
        if awaiting {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/* =========================
   UI helpers
   ========================= */

pub fn draw_message(ui: &mut egui::Ui, msg: &Message) {
    ui.add_space(6.0);

    match msg {
        Message::Narration(text) => {
            ui.group(|ui| {
                ui.label(egui::RichText::new(text).size(15.0));
            });
        }
        Message::System(text) => {
            ui.label(
                egui::RichText::new(text)
                    .color(egui::Color32::GRAY)
                    .italics(),
            );
        }
    }
}
