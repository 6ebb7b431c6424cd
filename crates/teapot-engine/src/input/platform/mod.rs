mod winit;

pub use self::winit::MouseEmulation;
