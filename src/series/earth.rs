//! Truncated VSOP87D series for the Earth.
//!
//! Heliocentric ecliptic longitude, latitude (radians) and radius (AU)
//! referred to the mean ecliptic and equinox of date, with time in Julian
//! millennia from J2000.0. Only the leading terms of each group are kept,
//! which is good to a few arcseconds over the present era.
//!
//! [`Vsop87Series::position`] precesses these coordinates to J2000.

use super::{SeriesCoordinates, SeriesEquinox, SeriesTerm, Vsop87Series};

const fn t(amplitude: f64, phase: f64, frequency: f64) -> SeriesTerm {
    SeriesTerm::new(amplitude, phase, frequency)
}

const L0: &[SeriesTerm] = &[
    t(1.75347046, 0.0, 0.0),
    t(0.03341656, 4.6692568, 6283.07585),
    t(0.00034894, 4.6261, 12566.1517),
    t(0.00003497, 2.7441, 5753.3849),
    t(0.00003418, 2.8289, 3.5231),
    t(0.00003136, 3.6277, 77713.7715),
    t(0.00002676, 4.4181, 7860.4194),
    t(0.00002343, 6.1352, 3930.2097),
    t(0.00001324, 0.7425, 11506.7698),
    t(0.00001273, 2.0371, 529.691),
    t(0.00001199, 1.1096, 1577.3435),
    t(0.0000099, 5.233, 5884.927),
    t(0.00000902, 2.045, 26.298),
    t(0.00000857, 3.508, 398.149),
    t(0.0000078, 1.179, 5223.694),
    t(0.00000753, 2.533, 5507.553),
    t(0.00000505, 4.583, 18849.228),
    t(0.00000492, 4.205, 775.523),
    t(0.00000357, 2.92, 0.067),
    t(0.00000317, 5.849, 11790.629),
];

const L1: &[SeriesTerm] = &[
    t(6283.31966747, 0.0, 0.0),
    t(0.00206059, 2.678235, 6283.07585),
    t(0.00004303, 2.6351, 12566.1517),
    t(0.00000425, 1.59, 3.523),
    t(0.00000119, 5.796, 26.298),
    t(0.00000109, 2.966, 1577.344),
    t(0.00000093, 2.59, 18849.23),
    t(0.00000072, 1.14, 529.69),
    t(0.00000068, 1.87, 398.15),
    t(0.00000067, 4.41, 5507.55),
];

const L2: &[SeriesTerm] = &[
    t(0.00052919, 0.0, 0.0),
    t(0.0000872, 1.0721, 6283.0758),
    t(0.00000309, 0.867, 12566.152),
    t(0.00000027, 0.05, 3.52),
    t(0.00000016, 5.19, 26.3),
    t(0.00000016, 3.68, 155.42),
];

const L3: &[SeriesTerm] = &[
    t(0.00000289, 5.844, 6283.076),
    t(0.00000035, 0.0, 0.0),
    t(0.00000017, 5.49, 12566.15),
];

const L4: &[SeriesTerm] = &[t(0.00000114, 3.142, 0.0), t(0.00000008, 4.13, 6283.08)];

const L5: &[SeriesTerm] = &[t(0.00000001, 3.14, 0.0)];

const B0: &[SeriesTerm] = &[
    t(0.0000028, 3.199, 84334.662),
    t(0.00000102, 5.422, 5507.553),
    t(0.0000008, 3.88, 5223.69),
    t(0.00000044, 3.7, 2352.87),
    t(0.00000032, 4.0, 1577.34),
];

const B1: &[SeriesTerm] = &[t(0.00000009, 3.9, 5507.55), t(0.00000006, 1.73, 5223.69)];

const R0: &[SeriesTerm] = &[
    t(1.00013989, 0.0, 0.0),
    t(0.016707, 3.0984635, 6283.07585),
    t(0.00013956, 3.05525, 12566.1517),
    t(0.00003084, 5.1985, 77713.7715),
    t(0.00001628, 1.1739, 5753.3849),
    t(0.00001576, 2.8469, 7860.4194),
    t(0.00000925, 5.453, 11506.77),
    t(0.00000542, 4.564, 3930.21),
    t(0.00000472, 3.661, 5884.927),
    t(0.00000346, 0.964, 5507.553),
    t(0.00000329, 5.9, 5223.694),
    t(0.00000307, 0.299, 5573.143),
    t(0.00000243, 4.273, 11790.629),
    t(0.00000212, 5.847, 1577.344),
    t(0.00000186, 5.022, 10977.079),
    t(0.00000175, 3.012, 18849.228),
    t(0.0000011, 5.055, 5486.778),
    t(0.00000098, 0.89, 6069.78),
    t(0.00000086, 5.69, 15720.84),
    t(0.00000086, 1.27, 161000.69),
];

const R1: &[SeriesTerm] = &[
    t(0.00103019, 1.10749, 6283.07585),
    t(0.00001721, 1.0644, 12566.1517),
    t(0.00000702, 3.142, 0.0),
    t(0.00000032, 1.02, 18849.23),
    t(0.00000031, 2.84, 5507.55),
    t(0.00000025, 1.32, 5223.69),
    t(0.00000018, 1.42, 1577.34),
    t(0.0000001, 5.91, 10977.08),
    t(0.00000009, 1.42, 6275.96),
    t(0.00000009, 0.27, 5486.78),
];

const R2: &[SeriesTerm] = &[
    t(0.00004359, 5.7846, 6283.0758),
    t(0.00000124, 5.579, 12566.152),
    t(0.00000012, 3.14, 0.0),
    t(0.00000009, 3.63, 77713.77),
    t(0.00000006, 1.87, 5573.14),
    t(0.00000003, 5.47, 18849.23),
];

const R3: &[SeriesTerm] = &[t(0.00000145, 4.273, 6283.076), t(0.00000007, 3.92, 12566.15)];

const R4: &[SeriesTerm] = &[t(0.00000004, 2.56, 6283.08)];

/// The Earth (more precisely the Earth-Moon system's Earth component),
/// heliocentric, VSOP87D.
pub const EARTH: Vsop87Series = Vsop87Series {
    name: "Earth",
    coordinates: SeriesCoordinates::Spherical,
    equinox: SeriesEquinox::OfDate,
    first: &[L0, L1, L2, L3, L4, L5],
    second: &[B0, B1],
    third: &[R0, R1, R2, R3, R4],
    bounding_radius_au: 1.0167,
    period_days: 365.256_363,
};
