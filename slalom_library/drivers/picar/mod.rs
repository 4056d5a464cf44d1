//! SunFounder PiCar-4WD driver
//!
//! The HAT carries a small MCU that exposes PWM channels over I2C. Each motor is
//! one PWM channel for power plus a GPIO line for direction; the ultrasonic mast
//! servo is PWM channel 0. The HC-SR04 sensor is wired straight to GPIO.
//!
//! Pin numbers in [`PicarConfig`] are BCM numbers.
//!
//! Only the register math is compiled without the `raspberry-pi` feature, so the
//! config can still be loaded and checked on a development machine.

use serde::{Deserialize, Serialize};
use slalom_core::MastAngle;
use std::time::Duration;

/// I2C address of the HAT's PWM controller
pub const PWM_I2C_ADDRESS: u16 = 0x14;

const REG_CHANNEL: u8 = 0x20;
const REG_PRESCALER: u8 = 0x40;
const REG_PERIOD: u8 = 0x44;

/// PWM controller clock
pub const PWM_CLOCK_HZ: u32 = 72_000_000;

/// Counter period used for both motors and the servo
pub const PWM_PERIOD: u16 = 4095;

/// Prescaler for the drive motor channels
pub const MOTOR_PRESCALER: u16 = 10;

const SERVO_FREQUENCY_HZ: u32 = 50;
const SERVO_MIN_PULSE_US: f64 = 500.0;
const SERVO_MAX_PULSE_US: f64 = 2500.0;
const SERVO_FRAME_US: f64 = 20_000.0;

/// One drive motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub pwm_channel: u8,
    pub direction_pin: u8,
    /// Motor is mounted backwards
    #[serde(default)]
    pub reversed: bool,
}

impl MotorConfig {
    pub const fn new(pwm_channel: u8, direction_pin: u8) -> Self {
        Self {
            pwm_channel,
            direction_pin,
            reversed: false,
        }
    }
}

/// PiCar-4WD wiring and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PicarConfig {
    pub i2c_bus: u8,
    pub i2c_address: u16,

    pub servo_channel: u8,
    /// Trim added to every mast angle
    pub servo_offset_degrees: MastAngle,
    /// Wait after moving the mast before pinging
    pub servo_travel_ms: u64,

    pub trigger_pin: u8,
    pub echo_pin: u8,
    /// Give up on an echo after this long
    pub echo_timeout_ms: u64,
    pub speed_of_sound_cm_s: f64,

    pub left_front: MotorConfig,
    pub right_front: MotorConfig,
    pub left_rear: MotorConfig,
    pub right_rear: MotorConfig,
}

impl Default for PicarConfig {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            i2c_address: PWM_I2C_ADDRESS,
            servo_channel: 0,
            servo_offset_degrees: 0,
            servo_travel_ms: 40,
            trigger_pin: 5,
            echo_pin: 6,
            echo_timeout_ms: 20,
            speed_of_sound_cm_s: 34_300.0,
            left_front: MotorConfig::new(13, 23),
            right_front: MotorConfig::new(12, 24),
            left_rear: MotorConfig::new(8, 13),
            right_rear: MotorConfig::new(9, 20),
        }
    }
}

impl PicarConfig {
    pub fn servo_travel(&self) -> Duration {
        Duration::from_millis(self.servo_travel_ms)
    }

    pub fn echo_timeout(&self) -> Duration {
        Duration::from_millis(self.echo_timeout_ms)
    }

    /// Motors in left-front, right-front, left-rear, right-rear order
    pub fn motors(&self) -> [MotorConfig; 4] {
        [self.left_front, self.right_front, self.left_rear, self.right_rear]
    }
}

/// Register write for the PWM controller: register byte then big-endian value
pub fn register_write(register: u8, value: u16) -> [u8; 3] {
    let [high, low] = value.to_be_bytes();
    [register, high, low]
}

pub fn channel_register(channel: u8) -> u8 {
    REG_CHANNEL + channel
}

/// Four channels share one timer
pub fn prescaler_register(channel: u8) -> u8 {
    REG_PRESCALER + channel / 4
}

pub fn period_register(channel: u8) -> u8 {
    REG_PERIOD + channel / 4
}

/// Prescaler giving a 50 Hz servo frame at the shared period
pub fn servo_prescaler() -> u16 {
    (PWM_CLOCK_HZ / SERVO_FREQUENCY_HZ / PWM_PERIOD as u32) as u16
}

/// Channel value for a mast angle. Angles are clamped to ±90° after the trim is applied.
pub fn servo_pulse(angle: MastAngle, offset: MastAngle) -> u16 {
    let angle = angle.saturating_add(offset).clamp(-90, 90) as f64;
    let pulse_us =
        SERVO_MIN_PULSE_US + (angle + 90.0) / 180.0 * (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US);
    (pulse_us / SERVO_FRAME_US * PWM_PERIOD as f64) as u16
}

/// Split signed motor power into (reverse, duty percent)
///
/// Non-zero power is mapped onto 50..=100% duty; below half duty the motors
/// stall instead of turning.
pub fn motor_duty(power: i32, reversed: bool) -> (bool, u8) {
    let power = power.clamp(-100, 100);
    let reverse = (power < 0) != reversed;
    let magnitude = power.unsigned_abs() as u8;
    let duty = if magnitude == 0 { 0 } else { magnitude / 2 + 50 };
    (reverse, duty)
}

pub fn duty_to_pulse(duty: u8) -> u16 {
    (duty.min(100) as f64 / 100.0 * PWM_PERIOD as f64) as u16
}

/// Distance for a round-trip echo, rounded to 0.01 cm
pub fn echo_to_cm(echo: Duration, speed_of_sound_cm_s: f64) -> f64 {
    let cm = echo.as_secs_f64() * speed_of_sound_cm_s / 2.0;
    (cm * 100.0).round() / 100.0
}

#[cfg(feature = "raspberry-pi")]
mod hardware {
    use super::*;
    use rppal::gpio::{Gpio, InputPin, OutputPin};
    use rppal::i2c::I2c;
    use slalom_core::{RangeReading, SlalomError, SlalomResult, Vehicle};
    use std::thread;
    use std::time::Instant;
    use tracing::{debug, trace, warn};

    fn open_pwm(config: &PicarConfig) -> SlalomResult<I2c> {
        let mut i2c = I2c::with_bus(config.i2c_bus)
            .map_err(|e| SlalomError::hardware(format!("open I2C bus {}: {}", config.i2c_bus, e)))?;
        i2c.set_slave_address(config.i2c_address).map_err(|e| {
            SlalomError::hardware(format!("select I2C address {:#x}: {}", config.i2c_address, e))
        })?;
        Ok(i2c)
    }

    fn write_register(i2c: &mut I2c, register: u8, value: u16) -> SlalomResult<()> {
        i2c.write(&register_write(register, value))
            .map_err(|e| SlalomError::hardware(format!("write PWM register {:#x}: {}", register, e)))?;
        Ok(())
    }

    struct Motor {
        config: MotorConfig,
        direction: OutputPin,
    }

    /// PiCar-4WD on a Raspberry Pi
    pub struct PicarVehicle {
        config: PicarConfig,
        pwm: I2c,
        motors: Vec<Motor>,
        trigger: OutputPin,
        echo: InputPin,
    }

    impl PicarVehicle {
        /// Claim the GPIO lines and I2C bus and put every motor at rest
        pub fn open(config: &PicarConfig) -> SlalomResult<Self> {
            let gpio = Gpio::new().map_err(|e| SlalomError::hardware(format!("open GPIO: {}", e)))?;
            let output = |pin: u8| -> SlalomResult<OutputPin> {
                Ok(gpio
                    .get(pin)
                    .map_err(|e| SlalomError::hardware(format!("claim GPIO {}: {}", pin, e)))?
                    .into_output())
            };

            let motors = config
                .motors()
                .into_iter()
                .map(|motor| {
                    Ok(Motor {
                        config: motor,
                        direction: output(motor.direction_pin)?,
                    })
                })
                .collect::<SlalomResult<Vec<_>>>()?;

            let trigger = output(config.trigger_pin)?;
            let echo = gpio
                .get(config.echo_pin)
                .map_err(|e| SlalomError::hardware(format!("claim GPIO {}: {}", config.echo_pin, e)))?
                .into_input();

            let mut pwm = open_pwm(config)?;
            for motor in &motors {
                let channel = motor.config.pwm_channel;
                write_register(&mut pwm, period_register(channel), PWM_PERIOD)?;
                write_register(&mut pwm, prescaler_register(channel), MOTOR_PRESCALER - 1)?;
            }
            write_register(&mut pwm, period_register(config.servo_channel), PWM_PERIOD)?;
            write_register(&mut pwm, prescaler_register(config.servo_channel), servo_prescaler() - 1)?;

            let mut vehicle = Self {
                config: config.clone(),
                pwm,
                motors,
                trigger,
                echo,
            };
            vehicle.set_power([0; 4])?;
            debug!(bus = config.i2c_bus, "PiCar-4WD opened");
            Ok(vehicle)
        }

        /// Zero every motor channel over a fresh I2C handle
        ///
        /// Works while another `PicarVehicle` holds the GPIO lines, so a signal
        /// handler can halt the car without access to the control loop's handle.
        pub fn stop_motors(config: &PicarConfig) -> SlalomResult<()> {
            let mut pwm = open_pwm(config)?;
            for motor in config.motors() {
                write_register(&mut pwm, channel_register(motor.pwm_channel), 0)?;
            }
            Ok(())
        }

        /// Signed power per motor, in `PicarConfig::motors` order
        fn set_power(&mut self, power: [i32; 4]) -> SlalomResult<()> {
            for (motor, power) in self.motors.iter_mut().zip(power) {
                let (reverse, duty) = motor_duty(power, motor.config.reversed);
                if reverse {
                    motor.direction.set_high();
                } else {
                    motor.direction.set_low();
                }
                write_register(
                    &mut self.pwm,
                    channel_register(motor.config.pwm_channel),
                    duty_to_pulse(duty),
                )?;
            }
            Ok(())
        }

        fn set_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
            let pulse = servo_pulse(angle, self.config.servo_offset_degrees);
            write_register(&mut self.pwm, channel_register(self.config.servo_channel), pulse)
        }

        /// One HC-SR04 measurement
        fn ping(&mut self) -> RangeReading {
            self.trigger.set_low();
            thread::sleep(Duration::from_millis(10));
            self.trigger.set_high();
            thread::sleep(Duration::from_micros(15));
            self.trigger.set_low();

            let timeout = self.config.echo_timeout();
            let started = Instant::now();

            let mut rise = started;
            while self.echo.is_low() {
                rise = Instant::now();
                if rise - started > timeout {
                    return RangeReading::NO_ECHO;
                }
            }

            let mut fall = rise;
            while self.echo.is_high() {
                fall = Instant::now();
                if fall - started > timeout {
                    return RangeReading::ECHO_TIMEOUT;
                }
            }

            RangeReading::from(echo_to_cm(fall - rise, self.config.speed_of_sound_cm_s))
        }
    }

    impl Vehicle for PicarVehicle {
        fn name(&self) -> &str {
            "picar-4wd"
        }

        fn drive_forward(&mut self, speed: u8) -> SlalomResult<()> {
            let p = speed as i32;
            self.set_power([p, p, p, p])
        }

        fn drive_backward(&mut self, speed: u8) -> SlalomResult<()> {
            let p = -(speed as i32);
            self.set_power([p, p, p, p])
        }

        fn turn_left(&mut self, speed: u8) -> SlalomResult<()> {
            let p = speed as i32;
            self.set_power([-p, p, -p, p])
        }

        fn turn_right(&mut self, speed: u8) -> SlalomResult<()> {
            let p = speed as i32;
            self.set_power([p, -p, p, -p])
        }

        fn stop(&mut self) -> SlalomResult<()> {
            self.set_power([0; 4])
        }

        fn measure_at(&mut self, angle: MastAngle) -> SlalomResult<RangeReading> {
            self.set_mast(angle)?;
            thread::sleep(self.config.servo_travel());
            let reading = self.ping();
            trace!(angle, %reading, "ping");
            Ok(reading)
        }

        fn aim_mast(&mut self, angle: MastAngle) -> SlalomResult<()> {
            self.set_mast(angle)
        }
    }

    impl Drop for PicarVehicle {
        fn drop(&mut self) {
            if let Err(e) = self.set_power([0; 4]) {
                warn!("failed to stop motors on close: {}", e);
            }
        }
    }
}

#[cfg(feature = "raspberry-pi")]
pub use hardware::PicarVehicle;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_register_layout() {
        assert_eq!(register_write(0x20, 0x0fff), [0x20, 0x0f, 0xff]);
        assert_eq!(channel_register(13), 0x2d);
        assert_eq!(prescaler_register(13), 0x43);
        assert_eq!(period_register(0), 0x44);
        assert_eq!(period_register(9), 0x46);
    }

    #[test]
    fn test_servo_pulse() {
        assert_eq!(servo_prescaler(), 351);
        assert_eq!(servo_pulse(-90, 0), 102);
        assert_eq!(servo_pulse(0, 0), 307);
        assert_eq!(servo_pulse(90, 0), 511);
    }

    #[test]
    fn test_servo_pulse_clamps_after_offset() {
        assert_eq!(servo_pulse(120, 0), servo_pulse(90, 0));
        assert_eq!(servo_pulse(85, 10), servo_pulse(90, 0));
        assert_eq!(servo_pulse(0, -5), servo_pulse(-5, 0));
    }

    #[test]
    fn test_motor_duty() {
        assert_eq!(motor_duty(0, false), (false, 0));
        assert_eq!(motor_duty(10, false), (false, 55));
        assert_eq!(motor_duty(-10, false), (true, 55));
        assert_eq!(motor_duty(100, false), (false, 100));
        assert_eq!(motor_duty(250, false), (false, 100));
    }

    #[test]
    fn test_reversed_motor_flips_direction() {
        assert_eq!(motor_duty(10, true), (true, 55));
        assert_eq!(motor_duty(-10, true), (false, 55));
    }

    #[test]
    fn test_duty_to_pulse() {
        assert_eq!(duty_to_pulse(0), 0);
        assert_eq!(duty_to_pulse(100), PWM_PERIOD);
        assert_eq!(duty_to_pulse(50), 2047);
    }

    #[test]
    fn test_echo_to_cm() {
        // 1 ms round trip
        assert_relative_eq!(echo_to_cm(Duration::from_millis(1), 34_300.0), 17.15);
        assert_relative_eq!(echo_to_cm(Duration::from_micros(583), 34_300.0), 10.0);
        assert_eq!(echo_to_cm(Duration::ZERO, 34_300.0), 0.0);
    }

    #[test]
    fn test_default_wiring() {
        let config = PicarConfig::default();
        let channels: Vec<u8> = config.motors().iter().map(|m| m.pwm_channel).collect();
        assert_eq!(channels, vec![13, 12, 8, 9]);
        assert_eq!(config.i2c_address, 0x14);
        assert_eq!(config.servo_travel(), Duration::from_millis(40));
    }

    #[test]
    fn test_partial_toml() {
        let config: PicarConfig = toml::from_str(
            r#"
            servo_offset_degrees = -3

            [left_front]
            pwm_channel = 13
            direction_pin = 23
            reversed = true
            "#,
        )
        .unwrap();

        assert!(config.left_front.reversed);
        assert_eq!(config.servo_offset_degrees, -3);
        assert_eq!(config.right_rear, PicarConfig::default().right_rear);
    }
}
