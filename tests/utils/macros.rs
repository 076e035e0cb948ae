#[macro_export]
macro_rules! assert_result {
    ($some:expr) => {
        assert!($some.is_ok(), "{}", $some.unwrap_err())
    };
}

/// Assert that a result failed with the given [`gyao_rs::GyaoError`] variant.
#[macro_export]
macro_rules! assert_error {
    ($some:expr, $variant:ident) => {
        match &$some {
            Err(gyao_rs::GyaoError::$variant(_)) => (),
            Err(e) => panic!(
                "expected {} error, got {} ({})",
                stringify!($variant),
                e.kind(),
                e
            ),
            Ok(_) => panic!("expected {} error, got ok", stringify!($variant)),
        }
    };
}
