//! Transmit engine tests against the simulated USART

use core::fmt::Write;

use usart_driver::{
    DataBits, FlowControl, Frame, LineConfig, TxError, Uart, UartConfig, UartError, UartId,
};
use usart_sim::{SimSystem, SimUsart};

fn configure<'a, 'b>(
    hw: &'a SimUsart,
    sys: &'a SimSystem<'b>,
    config: UartConfig,
) -> Uart<&'a SimUsart, &'a SimSystem<'b>> {
    Uart::configure(UartId::UART2, hw, sys, config).unwrap()
}

fn nine_bit() -> UartConfig {
    let mut line = LineConfig::new_8n1(115200);
    line.data_bits = DataBits::Nine;
    UartConfig::new(line)
}

#[test]
fn test_send_bytes() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default());

    assert_eq!(uart.send(b"hello"), Ok(5));
    assert_eq!(hw.sent_bytes(), b"hello");
}

#[test]
fn test_empty_send_touches_nothing() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default());
    hw.stick_tc(true);
    hw.limit_tx(0);

    assert_eq!(uart.send(&[]), Ok(0));
    assert_eq!(uart.send_frames(&[]), Ok(0));
    assert_eq!(hw.tx_polls(), 0);
    assert!(hw.sent().is_empty());
}

#[test]
fn test_txe_timeout_reports_frames_sent() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default().with_timeout_char(4));
    hw.limit_tx(3);

    let err = uart.send(b"abcdef").unwrap_err();
    assert_eq!(
        err,
        TxError {
            sent: 3,
            kind: UartError::Timeout
        }
    );
    assert_eq!(hw.sent_bytes(), b"abc");
}

#[test]
fn test_tc_timeout_reports_full_count() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default());
    hw.stick_tc(true);

    assert_eq!(
        uart.send(b"ab"),
        Err(TxError {
            sent: 2,
            kind: UartError::Timeout
        })
    );
    assert_eq!(hw.sent_bytes(), b"ab");
}

#[test]
fn test_per_char_wait_is_twice_char_timeout() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default().with_timeout_char(5));

    // Held for fewer polls than the 10 ms budget: goes through
    hw.hold_tx(8);
    assert_eq!(uart.send(b"a"), Ok(1));

    // Held for longer: gives up after the budget
    hw.clear_sent();
    hw.hold_tx(50);
    let start = sys.now();
    assert_eq!(uart.send(b"b").map_err(|e| e.sent), Err(0));
    let elapsed = sys.now().wrapping_sub(start);
    assert!((10..15).contains(&elapsed), "elapsed {}", elapsed);
}

#[test]
fn test_cts_peer_may_hold_up_to_overall_timeout() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let config = UartConfig::default()
        .with_flow_control(FlowControl::Cts)
        .with_timeout(100)
        .with_timeout_char(5);
    let uart = configure(&hw, &sys, config);

    // Far past 2 x timeout_char, within the overall timeout
    hw.hold_tx(50);
    assert_eq!(uart.send(b"ok"), Ok(2));
    assert_eq!(hw.sent_bytes(), b"ok");
}

#[test]
fn test_cts_timeout_bounds_whole_transfer() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let config = UartConfig::default()
        .with_flow_control(FlowControl::RtsCts)
        .with_timeout(100)
        .with_timeout_char(5);
    let uart = configure(&hw, &sys, config);
    hw.limit_tx(2);

    let start = sys.now();
    let err = uart.send(b"abcde").unwrap_err();
    let elapsed = sys.now().wrapping_sub(start);

    assert_eq!(err.sent, 2);
    assert_eq!(err.kind, UartError::Timeout);
    assert!((100..110).contains(&elapsed), "elapsed {}", elapsed);
}

#[test]
fn test_transmit_waits_never_idle() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default().with_timeout_char(5));

    hw.hold_tx(5);
    assert_eq!(uart.send(b"abc"), Ok(3));
    hw.stick_tc(true);
    assert!(uart.send(b"d").is_err());

    assert_eq!(sys.idles(), 0);
}

#[test]
fn test_nine_bit_send_decodes_pairs() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, nine_bit());

    assert_eq!(uart.send(&[0xFF, 0x01, 0x00, 0x01, 0x41, 0x00]), Ok(3));
    assert_eq!(hw.sent().as_slice(), &[0x1FF, 0x100, 0x041]);

    // Trailing odd byte is not a frame
    hw.clear_sent();
    assert_eq!(uart.send(&[0x02, 0x00, 0x03]), Ok(1));
    assert_eq!(hw.sent().as_slice(), &[0x002]);
}

#[test]
fn test_send_frames_masks_to_word_length() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default());

    assert_eq!(uart.send_frames(&[Frame(0x1AB), Frame(0x41)]), Ok(2));
    assert_eq!(hw.sent().as_slice(), &[0xAB, 0x41]);
}

#[test]
fn test_fmt_write() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default());

    let mut out = &uart;
    write!(out, "n={}", 42).unwrap();
    assert_eq!(hw.sent_bytes(), b"n=42");
}

#[test]
fn test_write_str_on_nine_bit_line_sends_one_frame_per_byte() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, nine_bit());

    uart.write_str("hi");
    assert_eq!(hw.sent().as_slice(), &[0x68, 0x69]);
}

#[test]
fn test_write_str_swallows_timeouts() {
    let hw = SimUsart::new();
    let sys = SimSystem::new().with_tick_per_read(1);
    let uart = configure(&hw, &sys, UartConfig::default());
    hw.limit_tx(1);

    uart.write_str("abc");
    assert_eq!(hw.sent_bytes(), b"a");
}
