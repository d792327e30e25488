//! Actuator and input drivers, generic over `embedded-hal` 1.0 traits.
//!
//! | Driver   | HAL trait                    | Drives                     |
//! |----------|------------------------------|----------------------------|
//! | `servo`  | `pwm::SetDutyCycle`          | Door lock bolt (50 Hz)     |
//! | `motor`  | `pwm::SetDutyCycle`          | Engine motor speed         |
//! | `buzzer` | `digital::OutputPin`         | Alarm buzzer               |
//! | `keypad` | `OutputPin` + `InputPin`     | Matrix keypad scanning     |
//!
//! `task_pin` spawns the keypad producer on a pinned FreeRTOS task.

pub mod buzzer;
pub mod keypad;
pub mod motor;
pub mod servo;
pub mod task_pin;
