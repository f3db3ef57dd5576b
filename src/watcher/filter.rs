use std::path::Path;

use notify::event::ModifyKind;
use notify::{Event, EventKind};

/// Whether `event` reports new content written to `log_file`.
///
/// Creation, removal, renames and metadata changes are ignored, as is every
/// other file in the watched directory.
pub fn is_log_write(event: &Event, log_file: &Path) -> bool {
    let written = matches!(
        event.kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    );
    written && event.paths.iter().any(|p| p == log_file)
}
