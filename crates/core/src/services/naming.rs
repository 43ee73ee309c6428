use std::io;
use std::path::Path;

use rand::Rng;

/// Inclusive range of the random suffix appended to output file names.
pub const SUFFIX_MIN: u32 = 100_000_000;
pub const SUFFIX_MAX: u32 = 999_999_999;

const FILE_SUFFIX: &str = "_imp.c";

/// Format an output file name for `function_name` with the given suffix.
pub fn file_name_for(function_name: &str, suffix: u32) -> String {
    format!("{function_name}_{suffix}{FILE_SUFFIX}")
}

/// Draw a fresh random 9-digit suffix.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(SUFFIX_MIN..=SUFFIX_MAX)
}

/// Return a file name of the form `{function_name}_{9 digits}_imp.c` that does
/// not exist in `folder` at call time.
///
/// The folder does not have to exist yet. If the existence check itself fails
/// (e.g. the folder is unreadable) the IO error is returned rather than
/// retrying forever.
pub fn generate_unique_file_name(folder: &Path, function_name: &str) -> io::Result<String> {
    generate_unique_file_name_with(&mut rand::thread_rng(), folder, function_name)
}

/// Same as [`generate_unique_file_name`] with a caller-supplied generator.
pub fn generate_unique_file_name_with<R: Rng + ?Sized>(
    rng: &mut R,
    folder: &Path,
    function_name: &str,
) -> io::Result<String> {
    loop {
        let candidate = file_name_for(function_name, random_suffix(rng));
        if !folder.join(&candidate).try_exists()? {
            return Ok(candidate);
        }
        tracing::debug!(%candidate, "output name already taken, drawing another");
    }
}

/// Check whether `candidate` matches `{function_name}_{9 digits}_imp.c`.
pub fn is_improved_file_name(function_name: &str, candidate: &str) -> bool {
    let Some(rest) = candidate.strip_prefix(function_name) else {
        return false;
    };
    let Some(rest) = rest.strip_prefix('_') else {
        return false;
    };
    let Some(digits) = rest.strip_suffix(FILE_SUFFIX) else {
        return false;
    };
    digits.len() == 9
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0')
}
