use serde::{Deserialize, Serialize};

use crate::engine::llm_client::NarratorSettings;

#[derive(Serialize, Deserialize, Clone)]
pub struct AppSettings {
    pub ui_scale: f32,
    pub narrator: NarratorSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            narrator: NarratorSettings::default(),
        }
    }
}
