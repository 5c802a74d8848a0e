//! Bit-operator boilerplate for the newtype wrappers `SQ` and `BitBoard`.

macro_rules! impl_bit_ops {
    ($t:ty, $inner:ty) => {
        impl ::std::ops::BitAnd for $t {
            type Output = $t;
            #[inline(always)]
            fn bitand(self, rhs: $t) -> $t {
                Self(self.0 & rhs.0)
            }
        }

        impl ::std::ops::BitOr for $t {
            type Output = $t;
            #[inline(always)]
            fn bitor(self, rhs: $t) -> $t {
                Self(self.0 | rhs.0)
            }
        }

        impl ::std::ops::BitXor for $t {
            type Output = $t;
            #[inline(always)]
            fn bitxor(self, rhs: $t) -> $t {
                Self(self.0 ^ rhs.0)
            }
        }

        impl ::std::ops::Not for $t {
            type Output = $t;
            #[inline(always)]
            fn not(self) -> $t {
                Self(!self.0)
            }
        }

        impl ::std::ops::BitAndAssign for $t {
            #[inline(always)]
            fn bitand_assign(&mut self, rhs: $t) {
                self.0 &= rhs.0;
            }
        }

        impl ::std::ops::BitOrAssign for $t {
            #[inline(always)]
            fn bitor_assign(&mut self, rhs: $t) {
                self.0 |= rhs.0;
            }
        }

        impl ::std::ops::BitXorAssign for $t {
            #[inline(always)]
            fn bitxor_assign(&mut self, rhs: $t) {
                self.0 ^= rhs.0;
            }
        }

        impl ::std::ops::Add<$inner> for $t {
            type Output = $t;
            #[inline(always)]
            fn add(self, rhs: $inner) -> $t {
                Self(self.0.wrapping_add(rhs))
            }
        }

        impl ::std::ops::Sub<$inner> for $t {
            type Output = $t;
            #[inline(always)]
            fn sub(self, rhs: $inner) -> $t {
                Self(self.0.wrapping_sub(rhs))
            }
        }

        impl ::std::ops::Add<$t> for $t {
            type Output = $t;
            #[inline(always)]
            fn add(self, rhs: $t) -> $t {
                Self(self.0.wrapping_add(rhs.0))
            }
        }

        impl ::std::ops::Sub<$t> for $t {
            type Output = $t;
            #[inline(always)]
            fn sub(self, rhs: $t) -> $t {
                Self(self.0.wrapping_sub(rhs.0))
            }
        }

        impl ::std::ops::Shl<u8> for $t {
            type Output = $t;
            #[inline(always)]
            fn shl(self, rhs: u8) -> $t {
                Self(self.0.wrapping_shl(rhs as u32))
            }
        }

        impl ::std::ops::Shr<u8> for $t {
            type Output = $t;
            #[inline(always)]
            fn shr(self, rhs: u8) -> $t {
                Self(self.0.wrapping_shr(rhs as u32))
            }
        }
    };
}
