//! Digest fixture generator
//!
//! Produces sorted SHA-256 digest files in the upload format: the digests of
//! the decimal strings `0..count`, or of the even numbers `0, 2, .., 2(count-1)`.
//! Two files of the same count, one of each profile, intersect in exactly the
//! even numbers below `count`.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use psi_core::{Digest, DigestList};
use sha2::{Digest as _, Sha256};

/// Largest supported `count`, about 3.2 GB of digests in memory
pub const MAX_COUNT: u64 = 100_000_000;

/// Which integers to hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    All,
    EvenOnly,
}

impl Profile {
    fn step(self) -> u64 {
        match self {
            Profile::All => 1,
            Profile::EvenOnly => 2,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::All => write!(f, "all"),
            Profile::EvenOnly => write!(f, "even-only"),
        }
    }
}

/// SHA-256 of the decimal representation of `value`
pub fn hash_value(value: u64) -> Digest {
    let hash: [u8; 32] = Sha256::digest(value.to_string().as_bytes()).into();
    Digest::from_bytes(hash)
}

/// Values hashed for a profile, in generation order. Stops short of `count`
/// if a value would overflow `u64`.
pub fn values(count: u64, profile: Profile) -> impl Iterator<Item = u64> {
    (0..count).map_while(move |i| i.checked_mul(profile.step()))
}

/// Generate `count` digests for `profile`, sorted ascending
pub fn generate(count: u64, profile: Profile) -> DigestList {
    generate_with_progress(count, profile, |_| {})
}

/// Like [`generate`], calling `on_progress` with the number hashed so far
pub fn generate_with_progress<F>(count: u64, profile: Profile, mut on_progress: F) -> DigestList
where
    F: FnMut(u64),
{
    let mut digests = Vec::with_capacity(count.min(MAX_COUNT) as usize);
    for (i, value) in values(count, profile).enumerate() {
        digests.push(hash_value(value));
        if (i + 1) % 100_000 == 0 {
            on_progress(i as u64 + 1);
        }
    }
    on_progress(count);

    digests.sort_unstable();
    DigestList::from_sorted(digests)
}

/// Conventional output file name, e.g. `data-100-even-only.csv`
pub fn file_name(count: u64, profile: Profile) -> String {
    format!("data-{}-{}.csv", count, profile)
}

/// Write one digest per line
pub fn write_digests(path: impl AsRef<Path>, digests: &DigestList) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for digest in digests {
        writeln!(writer, "{}", digest)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hash() {
        // sha256("0")
        assert_eq!(
            hash_value(0).to_string(),
            "5feceb66ffc86f38d952786c6d696c79c2dbc239dd4e91b46729d73a27fb57e9"
        );
    }

    #[test]
    fn test_generate_sorted_and_sized() {
        let list = generate(100, Profile::All);
        assert_eq!(list.len(), 100);
        assert!(list.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_even_only_values() {
        let values: Vec<u64> = values(4, Profile::EvenOnly).collect();
        assert_eq!(values, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_profiles_intersect_in_even_numbers() {
        let all = generate(100, Profile::All);
        let even = generate(100, Profile::EvenOnly);

        let mut expected: Vec<Digest> = (0..100).step_by(2).map(hash_value).collect();
        expected.sort_unstable();

        assert_eq!(all.intersect(&even), DigestList::from_sorted(expected));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(100, Profile::All), "data-100-all.csv");
        assert_eq!(file_name(5, Profile::EvenOnly), "data-5-even-only.csv");
    }

    #[test]
    fn test_written_file_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(file_name(10, Profile::All));
        let list = generate(10, Profile::All);

        write_digests(&path, &list).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 10);
        assert_eq!(DigestList::parse(&text).unwrap(), list);
    }
}
