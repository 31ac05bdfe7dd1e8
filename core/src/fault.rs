//! Fault boundary around handler invocations.
//!
//! [`catch`] runs a closure and turns a panic into a [`Fault`] value instead of
//! unwinding into the caller. A process-wide panic hook is installed the first
//! time the boundary is used. While a closure runs inside the boundary, the
//! hook records where the panic was raised and stays quiet; panics elsewhere go
//! to the previously installed hook unchanged.
//!
//! Locations are rendered relative to a [`SourceRoot`] computed once per
//! process and passed explicitly to the formatter.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

static HOOK: Once = Once::new();
static SOURCE_ROOT: OnceLock<SourceRoot> = OnceLock::new();

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST: RefCell<Option<PanicLocation>> = const { RefCell::new(None) };
}

/// Directory that absolute source paths are shortened against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot(Option<PathBuf>);

impl SourceRoot {
    /// Uses `path` as the root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    /// The process-wide root: the working directory at first use.
    pub fn detect() -> &'static SourceRoot {
        SOURCE_ROOT.get_or_init(|| Self(std::env::current_dir().ok()))
    }

    /// Returns the root directory, if one is known.
    pub fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

/// Source position a panic was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicLocation {
    /// Source file as recorded by the compiler.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
}

impl PanicLocation {
    /// Renders `file:line`, shortening absolute paths.
    ///
    /// Paths under `root` become relative to it; other absolute paths keep
    /// only their file name. Relative paths are kept as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{PanicLocation, SourceRoot};
    ///
    /// let root = SourceRoot::new("/work/todo");
    /// let inside = PanicLocation { file: "/work/todo/src/main.rs".into(), line: 7 };
    /// let expected = format!("src{}main.rs:7", std::path::MAIN_SEPARATOR);
    /// assert_eq!(inside.display_relative(&root), expected);
    ///
    /// let relative = PanicLocation { file: "src/lib.rs".into(), line: 3 };
    /// assert_eq!(relative.display_relative(&root), "src/lib.rs:3");
    /// ```
    pub fn display_relative(&self, root: &SourceRoot) -> String {
        let path = Path::new(&self.file);
        if !path.is_absolute() {
            return format!("{}:{}", self.file, self.line);
        }

        let shortened = root
            .path()
            .and_then(|root| path.strip_prefix(root).ok())
            .map(|relative| relative.display().to_string())
            .or_else(|| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| self.file.clone());
        format!("{shortened}:{}", self.line)
    }
}

/// A panic caught by [`catch`].
pub struct Fault {
    /// The panic payload.
    pub payload: Box<dyn Any + Send>,
    /// Where the panic was raised, when the hook saw it.
    pub location: Option<PanicLocation>,
}

impl Fault {
    /// The payload as text when it is a `&str` or `String`.
    pub fn message(&self) -> Option<&str> {
        if let Some(message) = self.payload.downcast_ref::<&'static str>() {
            return Some(message);
        }
        self.payload.downcast_ref::<String>().map(String::as_str)
    }
}

impl std::fmt::Debug for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fault")
            .field("message", &self.message())
            .field("location", &self.location)
            .finish()
    }
}

/// Restores the previous capture flag when the boundary exits.
struct CaptureGuard {
    previous: bool,
}

impl CaptureGuard {
    fn enter() -> Self {
        let previous = CAPTURING.with(|capturing| capturing.replace(true));
        Self { previous }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURING.with(|capturing| capturing.set(self.previous));
    }
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                let location = info.location().map(|location| PanicLocation {
                    file: location.file().to_string(),
                    line: location.line(),
                });
                LAST.with(|last| *last.borrow_mut() = location);
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs `f`, converting a panic into a [`Fault`].
pub fn catch<R>(f: impl FnOnce() -> R) -> Result<R, Fault> {
    install_hook();
    LAST.with(|last| last.borrow_mut().take());

    let result = {
        let _guard = CaptureGuard::enter();
        panic::catch_unwind(AssertUnwindSafe(f))
    };

    result.map_err(|payload| Fault {
        payload,
        location: LAST.with(|last| last.borrow_mut().take()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_passes_values_through() {
        assert_eq!(catch(|| 40 + 2).unwrap(), 42);
    }

    #[test]
    fn test_catch_records_message_and_location() {
        let fault = catch(|| -> () { panic!("boom {}", 7) }).unwrap_err();
        assert_eq!(fault.message(), Some("boom 7"));
        let location = fault.location.expect("hook records location");
        assert!(location.file.ends_with("fault.rs"));
        assert!(location.line > 0);
    }

    #[test]
    fn test_catch_static_str_payload() {
        let fault = catch(|| -> () { panic!("static") }).unwrap_err();
        assert_eq!(fault.message(), Some("static"));
    }

    #[test]
    fn test_catch_non_text_payload() {
        let fault = catch(|| -> () { std::panic::panic_any(17_u8) }).unwrap_err();
        assert_eq!(fault.message(), None);
        assert_eq!(fault.payload.downcast_ref::<u8>(), Some(&17));
    }

    #[test]
    fn test_nested_catch_restores_capture_flag() {
        let outer = catch(|| {
            let inner = catch(|| -> () { panic!("inner") });
            assert!(inner.is_err());
            assert!(CAPTURING.with(Cell::get));
            "done"
        });
        assert_eq!(outer.unwrap(), "done");
        assert!(!CAPTURING.with(Cell::get));
    }

    #[test]
    fn test_display_relative_outside_root_keeps_file_name() {
        let root = SourceRoot::new("/work/todo");
        let location = PanicLocation {
            file: "/home/user/.cargo/registry/src/lib.rs".to_string(),
            line: 12,
        };
        assert_eq!(location.display_relative(&root), "lib.rs:12");
    }

    #[test]
    fn test_detect_is_cached() {
        let first = SourceRoot::detect();
        let second = SourceRoot::detect();
        assert!(std::ptr::eq(first, second));
    }
}
