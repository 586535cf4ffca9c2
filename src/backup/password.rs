//! Temporary password generation for created users

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use zeroize::Zeroizing;

pub const PASSWORD_LENGTH: usize = 64;
pub const PASSWORD_DIGITS: usize = 10;
pub const PASSWORD_SYMBOLS: usize = 10;

const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "~!@#$%^&*()_+`-={}|[]\\:\"<>?,./";
const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a 64 character password with 10 digits, 10 symbols and mixed-case
/// letters for the rest, no character repeated. The buffer is wiped on drop.
pub fn generate_password() -> Zeroizing<String> {
    let mut rng = OsRng;
    let mut chars: Zeroizing<Vec<char>> = Zeroizing::new(Vec::with_capacity(PASSWORD_LENGTH));

    pick(&mut rng, DIGITS, PASSWORD_DIGITS, &mut chars);
    pick(&mut rng, SYMBOLS, PASSWORD_SYMBOLS, &mut chars);
    pick(
        &mut rng,
        LETTERS,
        PASSWORD_LENGTH - PASSWORD_DIGITS - PASSWORD_SYMBOLS,
        &mut chars,
    );
    chars.shuffle(&mut rng);

    Zeroizing::new(chars.iter().collect())
}

fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &str, count: usize, out: &mut Vec<char>) {
    let pool: Vec<char> = alphabet.chars().collect();
    out.extend(pool.choose_multiple(rng, count).copied());
}
