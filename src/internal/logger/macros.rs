// src/internal/logger/macros.rs
//
// Emission macros. Each level macro accepts, in order, an optional
// `logger: <facade>,` (defaults to the global facade) and an optional
// `name: <identity>,` followed by `format_args!` input:
//
//     sitelog::info!("loaded {} skills", count);
//     sitelog::warning!(name: "audio", "underrun on {device}");
//     sitelog::debug!(logger: facade, "state = {:?}", state);
//     sitelog::error!(logger: sitelog::name_logger("tts"), "synthesis failed");

/// Capture the current module, enclosing function and line.
#[macro_export]
macro_rules! callsite {
    () => {{
        fn __sitelog_probe() {}
        $crate::CallSite::new(
            ::std::module_path!(),
            $crate::CallSite::function_from_probe(::std::any::type_name_of_val(&__sitelog_probe)),
            ::std::line!(),
        )
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __sitelog_emit {
    ($level:expr, logger: $facade:expr, name: $name:expr, $($arg:tt)+) => {
        ($facade).emit(
            $level,
            $crate::Origin::Named(::std::convert::AsRef::<str>::as_ref(&$name)),
            ::std::format_args!($($arg)+),
        )
    };
    ($level:expr, logger: $facade:expr, $($arg:tt)+) => {
        ($facade).emit(
            $level,
            $crate::Origin::Site(&$crate::callsite!()),
            ::std::format_args!($($arg)+),
        )
    };
    ($level:expr, name: $name:expr, $($arg:tt)+) => {
        $crate::__sitelog_emit!($level, logger: $crate::global(), name: $name, $($arg)+)
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__sitelog_emit!($level, logger: $crate::global(), $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::__sitelog_emit!($crate::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__sitelog_emit!($crate::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)+) => {
        $crate::__sitelog_emit!($crate::Level::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__sitelog_emit!($crate::Level::Error, $($arg)+)
    };
}

/// Emit at ERROR with an error trace appended:
///
/// ```ignore
/// sitelog::exception!(err, "could not write {}", path.display());
/// sitelog::exception!(logger: facade, name: "tts", err, "synthesis failed");
/// ```
#[macro_export]
macro_rules! exception {
    (logger: $facade:expr, name: $name:expr, $err:expr, $($arg:tt)+) => {
        ($facade).emit_exception(
            $crate::Origin::Named(::std::convert::AsRef::<str>::as_ref(&$name)),
            &$err,
            ::std::format_args!($($arg)+),
        )
    };
    (logger: $facade:expr, $err:expr, $($arg:tt)+) => {
        ($facade).emit_exception(
            $crate::Origin::Site(&$crate::callsite!()),
            &$err,
            ::std::format_args!($($arg)+),
        )
    };
    (name: $name:expr, $err:expr, $($arg:tt)+) => {
        $crate::exception!(logger: $crate::global(), name: $name, $err, $($arg)+)
    };
    ($err:expr, $($arg:tt)+) => {
        $crate::exception!(logger: $crate::global(), $err, $($arg)+)
    };
}
