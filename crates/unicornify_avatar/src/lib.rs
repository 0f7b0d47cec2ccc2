//! Unicornify Avatar - seeded unicorn pictures
//!
//! A hex seed drives every random decision: the unicorn's proportions,
//! colors and pose, the painted background, the grass and the camera.
//! The same seed always produces the same picture.
//!
//! ```no_run
//! use unicornify_avatar::{make_avatar, AvatarOptions};
//!
//! let raster = make_avatar("d41d8cd98f00b204e9800998ecf8427e", 128, &AvatarOptions::default(), None)?;
//! raster.to_image().save("unicorn.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod avatar;
mod background;
mod data;
mod grass;
mod pose;
mod seed;
mod unicorn;

pub use avatar::{
    make_avatar, render_avatar, AvatarError, AvatarOptions, AvatarParameters, AvatarScene,
};
pub use data::{BackgroundData, Cloud, GrassData, Hair, UnicornData};
pub use grass::{Blade, GrassFill};
pub use pose::{Keyframes, Pose};
pub use seed::{mail_hash, parse_hex, random_hash, SeedError, SeedRandom};
pub use unicorn::{Leg, Unicorn};
