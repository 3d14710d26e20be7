//! Link tagging handler

use super::super::CliContext;
use anyhow::{Context, Result};
use gcm_tags::tags::UtmTagger;
use std::io::{self, Read};
use std::path::PathBuf;

/// Handler for the `tag` and `tag-url` commands
pub struct TagHandler<'a> {
    context: &'a CliContext,
}

impl<'a> TagHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    fn tagger(&self) -> UtmTagger {
        UtmTagger::from(&self.context.config_manager.config().tracking)
    }

    /// Tag every anchor in the file (or stdin) and print the result
    pub fn handle_tag(&self, file: Option<PathBuf>, source: &str, campaign: &str) -> Result<()> {
        let html = match file {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read HTML from stdin")?;
                buffer
            }
        };

        print!("{}", self.tagger().apply(&html, source, campaign));
        Ok(())
    }

    pub fn handle_tag_url(
        &self,
        url: &str,
        source: &str,
        campaign: &str,
        content: Option<&str>,
    ) -> Result<()> {
        println!("{}", self.tagger().process_url(url, source, campaign, content));
        Ok(())
    }
}
