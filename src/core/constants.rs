//! Engine-wide constants: projection calibration, zoom limits, and the wire
//! defaults of the three backing services. Keeping them in a single place
//! makes it easier to tweak engine-wide magic numbers.

/// Side length in pixels of the rendered map image (always square).
pub const MAP_IMAGE_SIZE: u32 = 450;

/// The `size` query value derived from [`MAP_IMAGE_SIZE`].
pub const MAP_IMAGE_SIZE_PARAM: &str = "450,450";

/// Empirical pixel-to-degree calibration along latitude at the 450x450
/// render size; a pixel offset scales by `K / 2^(zoom + 4)`.
pub const PAN_SCALE_LAT: f64 = 15.5;

/// Empirical pixel-to-degree calibration along longitude.
pub const PAN_SCALE_LON: f64 = 22.0;

/// Lowest zoom the static-map service renders.
pub const MIN_ZOOM: u8 = 1;

/// Highest zoom the static-map service renders.
pub const MAX_ZOOM: u8 = 20;

/// Zoom used for a freshly built view and restored on clear.
pub const DEFAULT_ZOOM: u8 = 12;

/// Pin style appended to the `pt` marker parameter.
pub const MARKER_STYLE: &str = "vkbkm";

/// Search window (`spn`) for nearest-organisation lookups, in degrees.
pub const NEAREST_SPAN: &str = "0.0015,0.0015";

/// Result-set size for nearest-organisation lookups.
pub const NEAREST_RESULTS: &str = "1";

/// Language the place-search and geocoder services answer in by default.
pub const DEFAULT_LANG: &str = "ru_RU";

/// Default endpoint of the static-map renderer.
pub const STATIC_MAP_URL: &str = "https://static-maps.yandex.ru/v1";

/// Default endpoint of the place-search service.
pub const SEARCH_URL: &str = "https://search-maps.yandex.ru/v1/";

/// Default endpoint of the geocoder service.
pub const GEOCODE_URL: &str = "https://geocode-maps.yandex.ru/v1";

/// Exact text an untouched address field holds; a submit carrying it (or
/// nothing) routes to the coordinate fields instead of the search pipeline.
pub const ADDRESS_PLACEHOLDER: &str = "Введите адрес или координаты объекта";
