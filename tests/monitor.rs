#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use linemon::{PortConfig, SerialChannel, StopBits};

    /// Needs a device on /dev/ttyUSB0 that echoes newline-terminated text
    #[test]
    #[ignore = "requires serial hardware"]
    fn test_hardware_echo() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let mut channel = SerialChannel::new(move |line| sink.lock().unwrap().push(line));
        channel.error_observer(|e| panic!("read loop failed: {e}"));

        let mut config = PortConfig::new("/dev/ttyUSB0");
        config.baud_rate = 115200;

        channel.open(config).unwrap();
        channel.send(b"ping\n").unwrap();

        std::thread::sleep(Duration::from_millis(500));
        channel.close();

        let received = lines.lock().unwrap();
        assert!(
            received.iter().any(|line| line.contains("ping")),
            "no echo received: {:?}",
            *received
        );
    }

    // These exercise the real serialport backend without hardware attached

    #[test]
    fn open_missing_device_is_device_not_found() {
        use linemon::error::OpenError;

        let mut channel = SerialChannel::new(|_| {});
        let result = channel.open(PortConfig::new("/dev/linemon-missing"));
        assert!(matches!(result, Err(OpenError::DeviceNotFound(_))));
    }

    #[test]
    fn open_rejects_one_point_five_stop_bits() {
        use linemon::error::OpenError;

        let mut channel = SerialChannel::new(|_| {});
        let mut config = PortConfig::new("/dev/linemon-missing");
        config.stop_bits = StopBits::OnePointFive;
        let result = channel.open(config);
        assert!(matches!(result, Err(OpenError::InvalidConfig(_))));
    }
}
