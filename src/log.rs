// This is free and unencumbered software released into the public domain.

#![allow(unused_macros)]

// Logging shims over the `tracing` re-export of `asimov-module`. With the
// `tracing` feature disabled the format arguments are still type-checked,
// but nothing is emitted.

macro_rules! log_event {
    ($level:ident, $($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        asimov_module::tracing::$level!(target: "droid_camera", $($arg)+);
        #[cfg(not(feature = "tracing"))]
        if false {
            let _ = ::std::format!($($arg)+);
        };
    }};
}

macro_rules! debug {
    ($($arg:tt)+) => { log_event!(debug, $($arg)+) };
}

macro_rules! info {
    ($($arg:tt)+) => { log_event!(info, $($arg)+) };
}

macro_rules! warn {
    ($($arg:tt)+) => { log_event!(warn, $($arg)+) };
}

macro_rules! error {
    ($($arg:tt)+) => { log_event!(error, $($arg)+) };
}
