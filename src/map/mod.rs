pub mod context;
pub mod leaflet;
pub mod surface;

pub use self::context::{MapContext, SharedMapContext};
pub use self::leaflet::LeafletScene;
pub use self::surface::{LatLng, LayerId};
