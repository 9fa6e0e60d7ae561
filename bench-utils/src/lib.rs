//! Lightweight nested-timer tracing, used to profile the isogeny-tree
//! traversal and pairing batches without pulling in a full tracing stack.
//!
//! Disabled by default; enable the `print-trace` feature to have
//! `start_timer!`/`end_timer!` print indented, colored timing output to
//! stderr. With the feature off, the macros compile away to a unit value.

#[cfg(feature = "print-trace")]
use colored::Colorize;

#[cfg(feature = "print-trace")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "print-trace")]
pub static NUM_INDENT: AtomicUsize = AtomicUsize::new(0);

#[doc(hidden)]
pub struct TimerInfo {
    pub msg: String,
    pub time: std::time::Instant,
}

#[macro_export]
macro_rules! start_timer {
    ($msg:expr) => {{
        #[cfg(feature = "print-trace")]
        {
            use colored::Colorize;
            let msg = $msg();
            let start_info = "Start:".yellow().bold();
            let indent = $crate::NUM_INDENT.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            eprintln!("{}{:8} {}", "  ".repeat(indent), start_info, msg);
            $crate::TimerInfo {
                msg: msg.to_string(),
                time: std::time::Instant::now(),
            }
        }
        #[cfg(not(feature = "print-trace"))]
        {
            let _ = || -> String { $msg().to_string() };
            $crate::TimerInfo {
                msg: String::new(),
                time: std::time::Instant::now(),
            }
        }
    }};
}

#[macro_export]
macro_rules! end_timer {
    ($time:expr) => {{
        $crate::end_timer!($time, || "");
    }};
    ($time:expr, $msg:expr) => {{
        #[cfg(feature = "print-trace")]
        {
            use colored::Colorize;
            let indent = $crate::NUM_INDENT.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
            let final_time = $time.time.elapsed();
            let final_time = {
                let secs = final_time.as_secs();
                let millis = final_time.subsec_millis();
                let micros = final_time.subsec_micros() % 1000;
                let nanos = final_time.subsec_nanos() % 1000;
                if secs != 0 {
                    format!("{}.{:03}s", secs, millis).bold()
                } else if millis > 0 {
                    format!("{}.{:03}ms", millis, micros).bold()
                } else if micros > 0 {
                    format!("{}.{:03}µs", micros, nanos).bold()
                } else {
                    format!("{}ns", final_time.subsec_nanos()).bold()
                }
            };
            let end_info = "End:".green().bold();
            let message = format!("{} {}", $time.msg, $msg());
            eprintln!(
                "{}{:8} {:.<pad$}{}",
                "  ".repeat(indent.saturating_sub(1)),
                end_info,
                message,
                final_time,
                pad = 75usize.saturating_sub(indent * 2)
            );
        }
        #[cfg(not(feature = "print-trace"))]
        {
            let _ = $time;
            let _ = || -> String { $msg().to_string() };
        }
    }};
}

#[macro_export]
macro_rules! add_to_trace {
    ($title:expr, $msg:expr) => {
        #[cfg(feature = "print-trace")]
        {
            use colored::Colorize;
            let indent = $crate::NUM_INDENT.load(std::sync::atomic::Ordering::Relaxed);
            let title = format!("{}", $title());
            let title = title.bold();
            let msg = format!("{}", $msg());
            eprintln!("{}{}: {}", "  ".repeat(indent), title, msg);
        }
        #[cfg(not(feature = "print-trace"))]
        {
            let _ = || -> String { $title().to_string() };
            let _ = || -> String { $msg().to_string() };
        }
    };
}
