//! GF(256) arithmetic for ECC200 Reed-Solomon
//!
//! Field generated by the primitive polynomial x^8 + x^5 + x^3 + x^2 + 1
//! (0x12D) with generator element 2. Tables are built at compile time; the
//! exp table is doubled so a sum of two logs never needs reduction.

const PRIMITIVE: u32 = 0x12D;

const fn build_exp() -> [u8; 510] {
    let mut exp = [0u8; 510];
    let mut x: u32 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        x <<= 1;
        if x >= 0x100 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    exp
}

const fn build_log() -> [u8; 256] {
    let mut log = [0u8; 256];
    let mut x: u32 = 1;
    let mut i = 0;
    while i < 255 {
        log[x as usize] = i as u8;
        x <<= 1;
        if x >= 0x100 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    log
}

static EXP_TABLE: [u8; 510] = build_exp();
static LOG_TABLE: [u8; 256] = build_log();

/// GF(256) field operations using log/exp tables
pub struct Gf256;

impl Gf256 {
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        EXP_TABLE[log_a + log_b]
    }

    /// Multiplicative inverse; callers must not pass 0
    pub fn inverse(a: u8) -> u8 {
        debug_assert!(a != 0);
        EXP_TABLE[255 - LOG_TABLE[a as usize] as usize]
    }

    /// alpha^n for arbitrary n
    pub fn exp(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }

    /// Discrete log of a nonzero element
    pub fn log(a: u8) -> usize {
        debug_assert!(a != 0);
        LOG_TABLE[a as usize] as usize
    }

    pub fn pow_usize(a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        EXP_TABLE[(log_a * (n % 255)) % 255]
    }
}
