// Console rename notifications
//
// Sink implementation that prints one line per accepted rename as merges
// happen, so the analyst sees progress during a long oracle pass.

use crossterm::style::Stylize;
use std::io::Write;

use crate::registry::{RenameEvent, RenameSink};

pub struct ConsoleSink;

impl RenameSink for ConsoleSink {
    fn on_rename(&self, event: &RenameEvent) {
        println!(
            "{} {} {} {} {}",
            "Updated".dark_grey(),
            format!("'{}'", event.old_name).white(),
            format!("(Type: {}) to", event.kind).dark_grey(),
            format!("'{}'", event.new_name).green(),
            format!("(UniqueId: {})", event.unique_id).dark_grey(),
        );
        let _ = std::io::stdout().flush();
    }
}
