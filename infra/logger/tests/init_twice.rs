use remit_logger::{Logger, LoggerError};

#[test]
fn second_install_is_rejected() {
    let _logger = Logger::builder("remit-first").init().expect("first init should succeed");

    let err = Logger::builder("remit-second").init().expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }), "unexpected error: {err}");
}
