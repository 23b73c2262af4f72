pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod orientation;
pub mod params;
pub mod resize;
pub mod sampled;

pub use decode::{ImageBounds, decode_bounds, decode_image, subsample};
pub use dimensions::{
    calculate_contain_dimensions, calculate_cover_dimensions, calculate_in_sample_size,
};
pub use encode::encode_image;
pub use orientation::{Orientation, apply_orientation, read_orientation};
pub use params::{NormalizeParams, OutputFormat};
pub use resize::{crop_to_fill, resize_image};
pub use sampled::decode_sampled;
