//! Object lifetime tracing
//!
//! A [`LifetimeTrace`] guard logs a debug line when it is created and another
//! when it is dropped. Embed one in a struct to see when instances come and go.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{Dispatcher, Routes, Severity};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Routes used for lifetime lines
pub const LIFETIME_ROUTES: Routes = Routes::SAVE_SESSION;

/// Guard logging the creation and destruction of an object
#[derive(Debug)]
pub struct LifetimeTrace {
    dispatcher: Option<Arc<Dispatcher>>,
    type_name: String,
    id: u64,
}

impl LifetimeTrace {
    /// Start tracing unless the dispatcher has lifetime display turned off
    pub fn new(dispatcher: &Arc<Dispatcher>, type_name: &str, args: &str) -> Self {
        if dispatcher.display_object_lifetime() {
            Self::forced(dispatcher, type_name, args)
        } else {
            Self {
                dispatcher: None,
                type_name: type_name.to_string(),
                id: 0,
            }
        }
    }

    /// Start tracing regardless of the dispatcher's setting
    pub fn forced(dispatcher: &Arc<Dispatcher>, type_name: &str, args: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let args = if args.is_empty() {
            String::new()
        } else {
            format!("({})", args)
        };
        dispatcher.emit(
            Severity::Debug,
            "new",
            &format!("Creating {}{}: #{}", type_name, args, id),
            LIFETIME_ROUTES,
        );

        Self {
            dispatcher: Some(Arc::clone(dispatcher)),
            type_name: type_name.to_string(),
            id,
        }
    }

    /// Identifier shown in both lines; 0 when tracing is off
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.dispatcher.is_some()
    }
}

impl Drop for LifetimeTrace {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.emit(
                Severity::Debug,
                "drop",
                &format!("Destroying {}: #{}", self.type_name, self.id),
                LIFETIME_ROUTES,
            );
        }
    }
}

impl Dispatcher {
    /// Trace the lifetime of an instance of `T`
    pub fn track<T: ?Sized>(self: &Arc<Self>, args: &str) -> LifetimeTrace {
        LifetimeTrace::new(self, short_type_name::<T>(), args)
    }

    /// Trace the lifetime of an instance of `T` even when display is off
    pub fn track_forced<T: ?Sized>(self: &Arc<Self>, args: &str) -> LifetimeTrace {
        LifetimeTrace::forced(self, short_type_name::<T>(), args)
    }
}

/// `std::any::type_name` without the module path
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    let start = base.rfind("::").map(|i| i + 2).unwrap_or(0);
    &full[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::CapturedOutput;
    use crate::logging::DispatcherSettings;
    use tempfile::TempDir;

    struct Connection {
        _trace: LifetimeTrace,
    }

    fn dispatcher(dir: &TempDir, display: bool) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::with_console(
            DispatcherSettings {
                output_dir: dir.path().to_path_buf(),
                display_object_lifetime: display,
                ..DispatcherSettings::default()
            },
            CapturedOutput::default().console(),
        ))
    }

    #[test]
    fn test_creation_and_destruction_logged() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = dispatcher(&temp_dir, true);

        let conn = Connection {
            _trace: dispatcher.track::<Connection>("peer=127.0.0.1"),
        };
        let id = conn._trace.id();
        drop(conn);

        let session = dispatcher.session_contents();
        let lines: Vec<&str> = session.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("D "));
        assert!(lines[0].ends_with(&format!("Creating Connection(peer=127.0.0.1): #{}", id)));
        assert!(lines[1].ends_with(&format!("Destroying Connection: #{}", id)));
        assert!(dispatcher.log_file_path().is_some());
    }

    #[test]
    fn test_disabled_logs_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = dispatcher(&temp_dir, false);

        let trace = LifetimeTrace::new(&dispatcher, "Quiet", "");
        assert!(!trace.is_active());
        drop(trace);

        assert_eq!(dispatcher.session_len(), 0);
        assert!(dispatcher.log_file_path().is_none());
    }

    #[test]
    fn test_forced_ignores_setting() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = dispatcher(&temp_dir, false);

        let trace = LifetimeTrace::forced(&dispatcher, "Loud", "");
        assert!(trace.is_active());
        drop(trace);

        assert_eq!(dispatcher.session_len(), 2);
        assert!(dispatcher.session_contents().contains("Creating Loud: #"));
    }

    #[test]
    fn test_track_forced_uses_type_name() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = dispatcher(&temp_dir, false);

        drop(dispatcher.track_forced::<Connection>("retry"));

        let session = dispatcher.session_contents();
        assert!(session.contains("Creating Connection(retry): #"));
        assert!(session.contains("Destroying Connection: #"));
    }

    #[test]
    fn test_ids_increase() {
        let temp_dir = TempDir::new().unwrap();
        let dispatcher = dispatcher(&temp_dir, true);

        let a = LifetimeTrace::new(&dispatcher, "A", "");
        let b = LifetimeTrace::new(&dispatcher, "B", "");
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Connection>(), "Connection");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<alloc::string::String>");
    }
}
