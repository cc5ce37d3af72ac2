use log::LevelFilter;
use uvm_log::StderrLogger;

#[test]
fn second_install_is_rejected() {
    StderrLogger::new(LevelFilter::Debug).init().unwrap();
    assert_eq!(log::max_level(), LevelFilter::Debug);

    assert!(StderrLogger::new(LevelFilter::Trace).init().is_err());
    log::info!("still routed to the first logger");
    uvm_log::uvm_trace!("trace output bypasses the level: {}\n", 1);
}
