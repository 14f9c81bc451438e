//! Alarm signal raised when a running task crosses a duration threshold.
//! Currently only macOS gets a desktop notification; every platform gets the bell.

use std::io::Write;
#[cfg(target_os = "macos")]
use std::process::Command;

/// Receiver of threshold alarms
pub trait Alarm {
    fn fire_alarm(&mut self);
}

impl<F: FnMut()> Alarm for F {
    fn fire_alarm(&mut self) {
        self()
    }
}

/// Rings the terminal bell and posts a desktop notification where supported
#[derive(Debug, Default)]
pub struct TerminalAlarm;

impl Alarm for TerminalAlarm {
    fn fire_alarm(&mut self) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
        notify_threshold_reached();
    }
}

/// Send a notification when a task timer reaches half or full duration
fn notify_threshold_reached() {
    #[cfg(target_os = "macos")]
    {
        let script = r#"display notification "⏰ Time check" with title "Tally - Timer Alarm""#;

        let _ = Command::new("osascript").arg("-e").arg(script).output();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_alarm() {
        let mut fired = 0;
        {
            let mut alarm = || fired += 1;
            alarm.fire_alarm();
            alarm.fire_alarm();
        }
        assert_eq!(fired, 2);
    }
}
