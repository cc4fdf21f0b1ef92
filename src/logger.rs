use std::fs::{File, create_dir_all};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Log event types that determine which receivers should log the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEvent {
    /// Per-round auction data (bids, winner, payment) in CSV form
    Auction,
    /// Model training data (initial weights, per-bidder losses)
    Training,
    /// Sampled entity preferences
    Entity,
    /// One line per simulation iteration
    Iteration,
    /// Aggregated results over all iterations
    Report,
}

impl LogEvent {
    /// This event and every less detailed one
    /// Hierarchy: Auction -> Training -> Entity -> Iteration -> Report
    fn and_upward(self) -> &'static [LogEvent] {
        const ALL: [LogEvent; 5] = [
            LogEvent::Auction,
            LogEvent::Training,
            LogEvent::Entity,
            LogEvent::Iteration,
            LogEvent::Report,
        ];
        match self {
            LogEvent::Auction => &ALL[0..],
            LogEvent::Training => &ALL[1..],
            LogEvent::Entity => &ALL[2..],
            LogEvent::Iteration => &ALL[3..],
            LogEvent::Report => &ALL[4..],
        }
    }
}

/// Trait for log receivers that can receive log messages
pub trait LogReceiver {
    /// Check if this receiver should handle the given log event
    fn should_log(&self, event: LogEvent) -> bool;

    /// Write a string to this receiver
    fn write(&mut self, s: &str) -> io::Result<()>;

    /// Flush this receiver
    fn flush(&mut self) -> io::Result<()>;
}

/// Console log receiver (writes to stdout)
pub struct ConsoleReceiver {
    enabled_events: Vec<LogEvent>,
}

impl ConsoleReceiver {
    /// Create a new console receiver
    /// Returns a boxed receiver ready to be added to a logger
    pub fn new(enabled_events: Vec<LogEvent>) -> Box<dyn LogReceiver> {
        Box::new(Self { enabled_events })
    }
}

impl LogReceiver for ConsoleReceiver {
    fn should_log(&self, event: LogEvent) -> bool {
        self.enabled_events.contains(&event)
    }

    fn write(&mut self, s: &str) -> io::Result<()> {
        print!("{}", s);
        io::stdout().flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// File log receiver (writes to a file)
pub struct FileReceiver {
    file: File,
    enabled_events: Vec<LogEvent>,
}

impl FileReceiver {
    /// Create a new file receiver that writes to the specified path
    /// The file is truncated if it exists and parent directories are created if needed
    pub fn new(path: &Path, enabled_events: Vec<LogEvent>) -> io::Result<Box<dyn LogReceiver>> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Box::new(Self { file, enabled_events }))
    }
}

impl LogReceiver for FileReceiver {
    fn should_log(&self, event: LogEvent) -> bool {
        self.enabled_events.contains(&event)
    }

    fn write(&mut self, s: &str) -> io::Result<()> {
        write!(self.file, "{}", s)?;
        self.file.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Unique identifier for a receiver
pub type ReceiverId = usize;

/// Global counter for generating unique receiver IDs
static RECEIVER_ID_COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Main logger that manages multiple receivers
pub struct Logger {
    receivers: Vec<(ReceiverId, Box<dyn LogReceiver>)>,
}

impl Logger {
    /// Create a new logger with no receivers
    pub fn new() -> Self {
        Self {
            receivers: Vec::new(),
        }
    }

    /// Add a receiver to the logger and return its unique ID
    pub fn add_receiver(&mut self, receiver: Box<dyn LogReceiver>) -> ReceiverId {
        let id = RECEIVER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.receivers.push((id, receiver));
        id
    }

    /// Remove a receiver by its ID
    pub fn remove_receiver(&mut self, id: ReceiverId) {
        self.receivers.retain(|(receiver_id, _)| *receiver_id != id);
    }

    /// Whether any receiver listens to the event, lets callers skip building expensive messages
    pub fn is_enabled(&self, event: LogEvent) -> bool {
        self.receivers.iter().any(|(_, receiver)| receiver.should_log(event))
    }

    /// Write a message with a specific log event type
    pub fn log(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        for (_, receiver) in &mut self.receivers {
            if receiver.should_log(event) {
                receiver.write(message)?;
            }
        }
        Ok(())
    }

    /// Write a message with newline
    pub fn logln(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        self.log(event, &format!("{}\n", message))
    }

    /// Write a prefixed message to the event and all upward events.
    /// Each receiver receives the message only once, even if it listens to several of them.
    fn log_with_prefix(&mut self, event: LogEvent, prefix: &str, message: &str) -> io::Result<()> {
        let events = event.and_upward();
        let formatted_message = format!("{} {}\n", prefix, message);
        for (_, receiver) in &mut self.receivers {
            if events.iter().any(|&evt| receiver.should_log(evt)) {
                receiver.write(&formatted_message)?;
            }
        }
        Ok(())
    }

    /// Write a message prefixed with "ERROR" to the event and all upward events
    pub fn errln(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        self.log_with_prefix(event, "ERROR", message)
    }

    /// Write a message prefixed with "WARNING" to the event and all upward events
    pub fn warnln(&mut self, event: LogEvent, message: &str) -> io::Result<()> {
        self.log_with_prefix(event, "WARNING", message)
    }

    /// Flush all receivers
    pub fn flush(&mut self) -> io::Result<()> {
        for (_, receiver) in &mut self.receivers {
            receiver.flush()?;
        }
        Ok(())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Sanitize a string to be used as a filename
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Macro to log a formatted string (like println! but for logger)
#[macro_export]
macro_rules! logln {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.logln($event, &format!($($arg)*));
        }
    };
}

/// Macro to log a formatted string without newline (like print! but for logger)
#[macro_export]
macro_rules! log {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.log($event, &format!($($arg)*));
        }
    };
}

/// Macro to log an error line to the specified event and all upward events
#[macro_export]
macro_rules! errln {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.errln($event, &format!($($arg)*));
        }
    };
}

/// Macro to log a warning line to the specified event and all upward events
#[macro_export]
macro_rules! warnln {
    ($logger:expr, $event:expr, $($arg:tt)*) => {
        {
            let _ = $logger.warnln($event, &format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Receiver writing into a shared buffer so tests can read it after handing it to the logger
    struct SharedReceiver {
        buffer: Rc<RefCell<Vec<String>>>,
        enabled_events: Vec<LogEvent>,
    }

    impl LogReceiver for SharedReceiver {
        fn should_log(&self, event: LogEvent) -> bool {
            self.enabled_events.contains(&event)
        }

        fn write(&mut self, s: &str) -> io::Result<()> {
            self.buffer.borrow_mut().push(s.to_string());
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn shared(events: Vec<LogEvent>) -> (Box<dyn LogReceiver>, Rc<RefCell<Vec<String>>>) {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let receiver = SharedReceiver {
            buffer: buffer.clone(),
            enabled_events: events,
        };
        (Box::new(receiver), buffer)
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test name"), "test_name");
        assert_eq!(sanitize_filename("test/name"), "test_name");
        assert_eq!(sanitize_filename("test:name"), "test_name");
    }

    #[test]
    fn test_routing_by_event() {
        let mut logger = Logger::new();
        let (receiver, buffer) = shared(vec![LogEvent::Report]);
        logger.add_receiver(receiver);

        logln!(logger, LogEvent::Training, "hidden");
        logln!(logger, LogEvent::Report, "shown {}", 1);
        assert_eq!(*buffer.borrow(), vec!["shown 1\n".to_string()]);
        assert!(logger.is_enabled(LogEvent::Report));
        assert!(!logger.is_enabled(LogEvent::Auction));
    }

    #[test]
    fn test_errln_reaches_upward_events_once() {
        let mut logger = Logger::new();
        let (receiver, buffer) = shared(vec![LogEvent::Iteration, LogEvent::Report]);
        logger.add_receiver(receiver);

        errln!(logger, LogEvent::Training, "bad step");
        warnln!(logger, LogEvent::Report, "careful");
        assert_eq!(
            *buffer.borrow(),
            vec!["ERROR bad step\n".to_string(), "WARNING careful\n".to_string()]
        );
    }

    #[test]
    fn test_file_receiver_content_visible_before_flush() {
        let path = std::env::temp_dir()
            .join(format!("auctionnet-logger-{}", std::process::id()))
            .join("iterations.csv");
        let mut logger = Logger::new();
        logger.add_receiver(FileReceiver::new(&path, vec![LogEvent::Iteration]).unwrap());

        log!(logger, LogEvent::Iteration, "seed,");
        logln!(logger, LogEvent::Iteration, "winner");
        logln!(logger, LogEvent::Report, "not for this file");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "seed,winner\n");

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_remove_receiver() {
        let mut logger = Logger::new();
        let (receiver, buffer) = shared(vec![LogEvent::Report]);
        let id = logger.add_receiver(receiver);
        logger.remove_receiver(id);
        logln!(logger, LogEvent::Report, "dropped");
        assert!(buffer.borrow().is_empty());
    }
}
