#![cfg_attr(not(test), no_std)]

//! STM32 port of the buffered USART driver.
//!
//! Provides [`Stm32Usart`], a volatile memory-mapped implementation of the
//! driver's register interface for both STM32 USART register generations,
//! the STM32F4 instance tables, and [`SysTickSystem`], a SysTick-driven
//! millisecond clock whose idle hook waits for the next interrupt.
//!
//! Board code owns the driver's instance registry and forwards each USART
//! interrupt vector to it; this crate only touches registers.

pub mod instances;
pub mod regs;
pub mod systick;
pub mod usart;

pub use instances::{stm32f4_base, stm32f4_irq, stm32f4_on_apb2};
pub use regs::RegisterLayout;
pub use systick::{systick_reload, SysTickSystem};
pub use usart::Stm32Usart;
