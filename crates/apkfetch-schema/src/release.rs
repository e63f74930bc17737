//! Public release dates of Android API levels.
//!
//! A build cannot target a level that did not exist when it was compiled, so
//! the mirror backend uses these dates to discard builds that are too old to
//! be worth downloading.

use chrono::NaiveDate;

/// `(api level, release date)` pairs, ascending.
const RELEASES: &[(u32, (i32, u32, u32))] = &[
    (1, (2008, 9, 23)),
    (2, (2009, 2, 9)),
    (3, (2009, 4, 27)),
    (4, (2009, 9, 15)),
    (5, (2009, 10, 27)),
    (6, (2009, 12, 3)),
    (7, (2010, 1, 11)),
    (8, (2010, 5, 20)),
    (9, (2010, 12, 6)),
    (10, (2011, 2, 9)),
    (11, (2011, 2, 22)),
    (12, (2011, 5, 10)),
    (13, (2011, 7, 15)),
    (14, (2011, 10, 18)),
    (15, (2011, 12, 16)),
    (16, (2012, 7, 9)),
    (17, (2012, 11, 13)),
    (18, (2013, 7, 24)),
    (19, (2013, 10, 31)),
    (20, (2014, 6, 25)),
    (21, (2014, 11, 4)),
    (22, (2015, 3, 2)),
    (23, (2015, 10, 2)),
    (24, (2016, 8, 22)),
    (25, (2016, 10, 4)),
    (26, (2017, 8, 21)),
    (27, (2017, 12, 5)),
    (28, (2018, 8, 6)),
    (29, (2019, 9, 3)),
    (30, (2020, 9, 8)),
    (31, (2021, 10, 4)),
    (32, (2022, 3, 7)),
    (33, (2022, 8, 15)),
    (34, (2023, 10, 4)),
    (35, (2024, 9, 3)),
];

/// Public release date of `level`, if known.
///
/// # Example
///
/// ```
/// use apkfetch_schema::release_date;
///
/// assert_eq!(release_date(30).unwrap().to_string(), "2020-09-08");
/// assert!(release_date(0).is_none());
/// ```
pub fn release_date(level: u32) -> Option<NaiveDate> {
    RELEASES
        .iter()
        .find(|(l, _)| *l == level)
        .and_then(|(_, (y, m, d))| NaiveDate::from_ymd_opt(*y, *m, *d))
}
