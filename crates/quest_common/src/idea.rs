//! Idea capture: free-form notes kept next to the quests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{require_name, Result};
use crate::lenient;
use crate::new_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    #[serde(default = "new_id", deserialize_with = "lenient::id_or_new")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(
        default = "lenient::missing_now",
        deserialize_with = "lenient::timestamp_or_now"
    )]
    pub created_at: DateTime<Utc>,
}

impl Idea {
    pub fn new(name: &str, description: &str, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            name: require_name("Idea name", name)?,
            description: description.trim().to_string(),
            created_at: now,
        })
    }

    pub(crate) fn apply_edit(&mut self, name: &str, description: &str) -> Result<()> {
        self.name = require_name("Idea name", name)?;
        self.description = description.trim().to_string();
        Ok(())
    }
}
