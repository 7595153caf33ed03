//! Reed-Solomon codec for ECC200 blocks
//!
//! Generator polynomial roots are alpha^1 .. alpha^d per ISO/IEC 16022, so
//! syndromes are evaluated at the same powers and Forney needs no extra
//! position factor.

use super::galois::Gf256;

/// Build the generator polynomial for `degree` parity codewords.
///
/// Coefficients are returned highest power first with the leading 1 implied,
/// ready for shift-register division.
pub fn compute_divisor(degree: usize) -> Vec<u8> {
    let mut result = vec![0u8; degree];
    result[degree - 1] = 1;
    let mut root = 2u8; // alpha^1
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = Gf256::mul(result[j], root);
            if j + 1 < degree {
                result[j] ^= result[j + 1];
            }
        }
        root = Gf256::mul(root, 2);
    }
    result
}

/// Remainder of `data * x^degree` divided by the generator polynomial.
/// The returned parity codewords are appended to the data as-is.
pub fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let degree = divisor.len();
    let mut remainder = vec![0u8; degree];
    for &b in data {
        let factor = b ^ remainder[0];
        for j in 0..degree - 1 {
            remainder[j] = remainder[j + 1];
        }
        remainder[degree - 1] = 0;
        for (j, &coef) in divisor.iter().enumerate() {
            remainder[j] ^= Gf256::mul(coef, factor);
        }
    }
    remainder
}

/// Reed-Solomon decoder for one interleaved block
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct errors in-place. The block is data codewords followed by
    /// parity; on failure the block contents are unspecified.
    pub fn decode(&self, received: &mut [u8]) -> Result<(), &'static str> {
        let syndrome = self.calculate_syndrome(received);
        let has_errors = syndrome.iter().any(|&s| s != 0);
        if !has_errors {
            return Ok(());
        }

        let sigma = self.find_error_locator(&syndrome);
        let num_errors = sigma.len() - 1;
        if num_errors == 0 || num_errors > self.num_ecc_codewords / 2 {
            return Err("Too many errors");
        }

        let error_positions = self.find_error_positions(&sigma, received.len())?;
        let error_values =
            self.find_error_values(&sigma, &syndrome, &error_positions, received.len())?;

        for (i, &pos) in error_positions.iter().enumerate() {
            received[pos] ^= error_values[i];
        }

        let new_syndrome = self.calculate_syndrome(received);
        if new_syndrome.iter().any(|&s| s != 0) {
            return Err("Uncorrectable error");
        }

        Ok(())
    }

    fn calculate_syndrome(&self, received: &[u8]) -> Vec<u8> {
        let n = received.len();
        let mut syndrome = vec![0u8; self.num_ecc_codewords];

        // syndrome[i] is the received polynomial evaluated at alpha^(i+1),
        // with c[0] the coefficient of x^(n-1)
        for (i, syndrome_i) in syndrome.iter_mut().enumerate() {
            let mut sum = 0u8;
            for (j, &received_j) in received.iter().enumerate() {
                let term = Gf256::mul(received_j, Gf256::pow_usize(2, (i + 1) * (n - 1 - j)));
                sum ^= term;
            }
            *syndrome_i = sum;
        }

        syndrome
    }

    fn find_error_locator(&self, syndrome: &[u8]) -> Vec<u8> {
        // Berlekamp-Massey algorithm
        let n = syndrome.len();
        let mut sigma = vec![1u8];
        let mut b = vec![1u8];
        let mut delta_b: u8 = 1;
        let mut l = 0;
        let mut m = 1;

        for i in 0..n {
            let mut delta = syndrome[i];
            for j in 1..=l {
                if j < sigma.len() && i >= j {
                    delta ^= Gf256::mul(sigma[j], syndrome[i - j]);
                }
            }

            if delta == 0 {
                m += 1;
            } else if 2 * l <= i {
                let sigma_new = sigma.clone();
                let d = Gf256::mul(delta, Gf256::inverse(delta_b));

                while sigma.len() < b.len() + m {
                    sigma.push(0);
                }
                // sigma = sigma - d * x^m * b
                for j in 0..b.len() {
                    let term = Gf256::mul(d, b[j]);
                    if j + m < sigma.len() {
                        sigma[j + m] ^= term;
                    }
                }

                b = sigma_new;
                delta_b = delta;
                l = i + 1 - l;
                m = 1;
            } else {
                let d = Gf256::mul(delta, Gf256::inverse(delta_b));

                while sigma.len() < b.len() + m {
                    sigma.push(0);
                }
                for j in 0..b.len() {
                    let term = Gf256::mul(d, b[j]);
                    if j + m < sigma.len() {
                        sigma[j + m] ^= term;
                    }
                }

                m += 1;
            }
        }

        while sigma.len() > 1 && sigma.last() == Some(&0) {
            sigma.pop();
        }
        sigma
    }

    fn find_error_positions(&self, sigma: &[u8], n: usize) -> Result<Vec<usize>, &'static str> {
        let mut positions = Vec::new();

        // Chien search: roots of sigma are X_k^{-1} with X_k = alpha^(n-1-pos)
        for i in 0..n {
            let exp = (n - 1 - i) % 255;
            let x_inv = if exp == 0 {
                1u8
            } else {
                Gf256::pow_usize(2, 255 - exp)
            };
            let mut sum = 0u8;
            for (j, &coeff) in sigma.iter().enumerate() {
                sum ^= Gf256::mul(coeff, Gf256::pow_usize(x_inv, j));
            }
            if sum == 0 {
                positions.push(i);
            }
        }

        if positions.len() != sigma.len() - 1 {
            return Err("Wrong number of error positions found");
        }

        Ok(positions)
    }

    fn find_error_values(
        &self,
        sigma: &[u8],
        syndrome: &[u8],
        error_positions: &[usize],
        n: usize,
    ) -> Result<Vec<u8>, &'static str> {
        // omega = syndrome * sigma mod x^(2t)
        let mut omega = vec![0u8; syndrome.len()];
        for i in 0..syndrome.len() {
            for j in 0..=i {
                if j < sigma.len() && i - j < syndrome.len() {
                    omega[i] ^= Gf256::mul(sigma[j], syndrome[i - j]);
                }
            }
        }

        let mut values = Vec::with_capacity(error_positions.len());

        for &pos in error_positions {
            let exp = (n - 1 - pos) % 255;
            let x_inv = if exp == 0 {
                1u8
            } else {
                Gf256::pow_usize(2, 255 - exp)
            };

            let mut omega_val = 0u8;
            for (i, &coeff) in omega.iter().enumerate() {
                omega_val ^= Gf256::mul(coeff, Gf256::pow_usize(x_inv, i));
            }

            // Formal derivative of sigma evaluated at the root
            let mut sigma_prime_val = 0u8;
            for (i, &coeff) in sigma.iter().enumerate().skip(1) {
                if i % 2 == 1 {
                    sigma_prime_val ^= Gf256::mul(coeff, Gf256::pow_usize(x_inv, i - 1));
                }
            }

            if sigma_prime_val == 0 {
                return Err("Sigma derivative is zero");
            }

            // Forney with roots at alpha^1..alpha^d: e = omega(X^-1) / sigma'(X^-1)
            let error_value = Gf256::mul(omega_val, Gf256::inverse(sigma_prime_val));
            values.push(error_value);
        }

        Ok(values)
    }
}
