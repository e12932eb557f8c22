#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use convmask_image as image;

#[doc(inline)]
pub use convmask_imgproc as imgproc;

#[doc(inline)]
pub use convmask_io as io;
