//! Call-site resolution for loggers wrapped in helper functions
//!
//! `#[track_caller]` already yields the direct caller of a level method,
//! which corresponds to the default skip depth of 2. A larger depth walks the
//! current backtrace upwards from that frame.

use super::log_entry::Caller;
use std::panic::Location;
use std::path::PathBuf;

/// Skip depth whose call site `#[track_caller]` reports by itself
pub const DEFAULT_SKIP_FRAMES: usize = 2;

struct ResolvedFrame {
    file: PathBuf,
    line: u32,
    function: Option<String>,
}

/// Frames to walk past the direct caller for a configured skip depth
pub(crate) fn extra_frames(skip_frames: usize) -> usize {
    skip_frames.saturating_sub(DEFAULT_SKIP_FRAMES)
}

/// The call site `extra` frames above `location`.
///
/// Falls back to `location` itself when the binary has no debug info or the
/// stack is not deep enough.
pub(crate) fn resolve(location: &'static Location<'static>, extra: usize) -> Caller {
    let direct = Caller::from_location(location);
    if extra == 0 {
        return direct;
    }

    let frames = capture_frames();
    let Some(start) = frames
        .iter()
        .position(|f| f.line == location.line() && f.file.ends_with(location.file()))
    else {
        return direct;
    };
    let Some(target) = frames.get(start + extra) else {
        return direct;
    };

    // Report paths relative to the same root as `Location::file`
    let direct_path = frames[start].file.to_string_lossy();
    let root = direct_path
        .strip_suffix(location.file())
        .unwrap_or_default();
    let target_path = target.file.to_string_lossy();
    let file = target_path.strip_prefix(root).unwrap_or(&target_path);

    let caller = Caller::new(file, target.line);
    match target.function {
        Some(ref function) => caller.with_function(function.as_str()),
        None => caller,
    }
}

/// Innermost first; inlined calls appear as separate entries
fn capture_frames() -> Vec<ResolvedFrame> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        backtrace::resolve_frame(frame, |symbol| {
            if let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) {
                frames.push(ResolvedFrame {
                    file: file.to_path_buf(),
                    line,
                    function: symbol.name().map(|name| format!("{:#}", name)),
                });
            }
        });
        true
    });
    frames
}
