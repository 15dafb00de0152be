//! Model — ParserConfig.

use serde::{Deserialize, Serialize};

use crate::logs::page::DEFAULT_PAGE_SIZE;
use crate::parser::MAX_LINE_SIZE;

use super::load::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Longest accepted input line, in bytes
    pub max_line_bytes: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: MAX_LINE_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 1000,
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_bytes == 0 {
            return Err(ConfigError::Invalid("max_line_bytes must be > 0".to_string()));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid("default_page_size must be > 0".to_string()));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size ({}) must not exceed max_page_size ({})",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}
