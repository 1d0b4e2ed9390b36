use std::fmt::{Debug, Display};

use parking_lot::Mutex;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageLevel {
    Info = 0,
    Warning = 1,
    Error = 2,
    UnrecoverableError = 3,
}

static MESSAGES_CALLBACK: Mutex<Option<fn(MessageLevel, &str)>> = Mutex::new(None);

/// Redirects every message to `callback`, nothing is written to the console afterwards
pub fn setup_logging_callback(callback: fn(MessageLevel, &str)) {
    let mut messages_callback = MESSAGES_CALLBACK.lock();
    *messages_callback = Some(callback);
}

pub fn reset_logging_callback() {
    *MESSAGES_CALLBACK.lock() = None;
}

pub fn log(level: MessageLevel, message: &str) {
    // Copy the callback out so that it can log recursively without deadlocking
    let callback = *MESSAGES_CALLBACK.lock();
    if let Some(callback) = callback {
        callback(level, message);
    } else {
        match level {
            MessageLevel::Info => println!("{}", message),
            MessageLevel::Warning => eprintln!("Warning: {}", message),
            MessageLevel::Error => eprintln!("Error: {}", message),
            MessageLevel::UnrecoverableError => panic!("{}", message),
        }
    }
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log($crate::MessageLevel::Info, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log($crate::MessageLevel::Warning, &format!($($arg)*));
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log($crate::MessageLevel::Error, &format!($($arg)*));
    };
}

pub trait UnrecoverableErrorLogging {
    fn log_unrecoverable_error(self, message: &str) -> Self;
    fn log_unrecoverable_error_with_data<D: Display>(self, message: &str, data: D) -> Self;
}

impl<T, E: Debug> UnrecoverableErrorLogging for std::result::Result<T, E> {
    fn log_unrecoverable_error(self, message: &str) -> Self {
        if let Err(err) = &self {
            log(
                MessageLevel::UnrecoverableError,
                &format!("{}: {:?}", message, err),
            );
        }
        self
    }

    fn log_unrecoverable_error_with_data<D: Display>(self, message: &str, data: D) -> Self {
        if let Err(err) = &self {
            log(
                MessageLevel::UnrecoverableError,
                &format!("{} [{}]: {:?}", message, data, err),
            );
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static RECEIVED: Mutex<Vec<(MessageLevel, String)>> = Mutex::new(Vec::new());

    fn collect(level: MessageLevel, message: &str) {
        RECEIVED.lock().push((level, message.to_string()));
    }

    // Single test: the callback slot is process-wide
    #[test]
    fn callback_receives_messages() {
        setup_logging_callback(collect);

        info!("started {} threads", 2);
        warn!("slow");
        error!("worker {} stopped", 3);

        let res: Result<(), &str> = Err("no memory");
        let _ = res.log_unrecoverable_error_with_data("creating semaphore", 5);

        let ok: Result<u8, &str> = Ok(1);
        assert_eq!(ok.log_unrecoverable_error("never logged"), Ok(1));

        reset_logging_callback();

        let received = RECEIVED.lock();
        assert_eq!(
            *received,
            vec![
                (MessageLevel::Info, "started 2 threads".to_string()),
                (MessageLevel::Warning, "slow".to_string()),
                (MessageLevel::Error, "worker 3 stopped".to_string()),
                (
                    MessageLevel::UnrecoverableError,
                    "creating semaphore [5]: \"no memory\"".to_string()
                ),
            ]
        );
    }
}
