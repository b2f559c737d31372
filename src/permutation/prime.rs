//! Number-theoretic helpers for the affine permutations.

/// Overflow-safe modular multiplication via double-and-add.
///
/// Keeps `a * b mod m` exact for any u64 operands, which the 64-bit affine
/// permutation needs for domains past 2^32.
pub fn mul_mod(mut a: u64, mut b: u64, m: u64) -> u64 {
    debug_assert!(m > 0);
    a %= m;
    let mut result = 0u64;
    while b > 0 {
        if b & 1 == 1 {
            result = add_mod(result, a, m);
        }
        a = add_mod(a, a, m);
        b >>= 1;
    }
    result
}

fn add_mod(a: u64, b: u64, m: u64) -> u64 {
    // a, b < m; the subtraction form avoids u64 overflow.
    if a >= m - b {
        a - (m - b)
    } else {
        a + b
    }
}

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Deterministic Miller-Rabin primality test for u64.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &[2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }

    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    // This witness set is deterministic for all n < 2^64.
    'witness: for &a in &[2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 0..r - 1 {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1u64 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Largest prime less than or equal to `n`, or `None` below 2.
pub fn largest_prime_leq(n: u64) -> Option<u64> {
    let mut candidate = n;
    while candidate >= 2 {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate -= 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime_small() {
        let primes = [2u64, 3, 5, 7, 11, 13, 97, 7919];
        let composites = [0u64, 1, 4, 9, 91, 7917, 7921];
        for p in primes {
            assert!(is_prime(p), "{} should be prime", p);
        }
        for c in composites {
            assert!(!is_prime(c), "{} should be composite", c);
        }
    }

    #[test]
    fn test_is_prime_large() {
        // Largest prime below 2^32 and a known 2^61-1 Mersenne prime.
        assert!(is_prime(4_294_967_291));
        assert!(is_prime(2_305_843_009_213_693_951));
        assert!(!is_prime(4_294_967_295));
    }

    #[test]
    fn test_largest_prime_leq() {
        assert_eq!(largest_prime_leq(1), None);
        assert_eq!(largest_prime_leq(2), Some(2));
        assert_eq!(largest_prime_leq(100), Some(97));
        assert_eq!(largest_prime_leq(97), Some(97));
        assert_eq!(largest_prime_leq(1 << 32), Some(4_294_967_291));
    }

    #[test]
    fn test_mul_mod_matches_u128() {
        let cases = [
            (3u64, 5u64, 7u64),
            (u64::MAX - 1, u64::MAX - 2, u64::MAX - 58),
            (1 << 40, 1 << 40, (1 << 61) - 1),
        ];
        for (a, b, m) in cases {
            let expected = ((a as u128 * b as u128) % m as u128) as u64;
            assert_eq!(mul_mod(a, b, m), expected);
        }
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(0, 9), 9);
    }
}
