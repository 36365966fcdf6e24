//! Byte order handling for the fixed-width primitives. Every multi-byte primitive of one `encode` or `decode` call is
//! written in the same order.

use std::mem::size_of;

/// The order in which the bytes of multi-byte primitives appear on wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {

    /// The byte order of the target platform
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "big") { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };

}

/// A numeric value with a fixed width on wire.
pub trait Primitive: Copy {
    const WIDTH: usize;

    /// Appends exactly `WIDTH` bytes to `out`
    fn put(self, order: ByteOrder, out: &mut Vec<u8>);

    /// Reads the value from the first `WIDTH` bytes of `buf`. The caller guarantees that `buf` is long enough.
    fn get(order: ByteOrder, buf: &[u8]) -> Self;
}

macro_rules! primitive {
    ($($ty:ty),*) => { $(
        impl Primitive for $ty {
            const WIDTH: usize = size_of::<$ty>();

            #[inline]
            fn put(self, order: ByteOrder, out: &mut Vec<u8>) {
                match order {
                    ByteOrder::LittleEndian => out.extend_from_slice(&self.to_le_bytes()),
                    ByteOrder::BigEndian    => out.extend_from_slice(&self.to_be_bytes()),
                }
            }

            #[inline]
            fn get(order: ByteOrder, buf: &[u8]) -> Self {
                let mut tmp = [0u8; size_of::<$ty>()];
                tmp.copy_from_slice(&buf[..size_of::<$ty>()]);
                match order {
                    ByteOrder::LittleEndian => <$ty>::from_le_bytes(tmp),
                    ByteOrder::BigEndian    => <$ty>::from_be_bytes(tmp),
                }
            }
        }
    )* }
}

primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl Primitive for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn put(self, _order: ByteOrder, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    #[inline]
    fn get(_order: ByteOrder, buf: &[u8]) -> Self {
        buf[0] != 0
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteOrder, Primitive};

    #[test]
    fn orders() {
        let mut buf = Vec::new();
        0x0102_0304u32.put(ByteOrder::LittleEndian, &mut buf);
        0x0102_0304u32.put(ByteOrder::BigEndian, &mut buf);
        assert_eq!(buf, [4, 3, 2, 1, 1, 2, 3, 4]);
        assert_eq!(0x0102_0304, u32::get(ByteOrder::LittleEndian, &buf));
        assert_eq!(0x0403_0201, u32::get(ByteOrder::BigEndian, &buf));
    }

    #[test]
    fn unsigned_reads_keep_their_width() {
        let buf = [0xff; 8];
        assert_eq!(u16::MAX, u16::get(ByteOrder::LittleEndian, &buf));
        assert_eq!(u32::MAX, u32::get(ByteOrder::BigEndian, &buf));
        assert_eq!(-1, i16::get(ByteOrder::LittleEndian, &buf));
        assert_eq!(-1, i64::get(ByteOrder::BigEndian, &buf));
    }

    #[test]
    fn floats() {
        assert_eq!(1.5399896e-36, f32::get(ByteOrder::LittleEndian, &[1, 2, 3, 4]));
        assert_eq!(5.447603722011605e-270, f64::get(ByteOrder::LittleEndian, &[1, 2, 3, 4, 5, 6, 7, 8]));
        let mut buf = Vec::new();
        std::f64::consts::PI.put(ByteOrder::BigEndian, &mut buf);
        assert_eq!(std::f64::consts::PI, f64::get(ByteOrder::BigEndian, &buf));
    }

    #[test]
    fn booleans() {
        let mut buf = Vec::new();
        true.put(ByteOrder::BigEndian, &mut buf);
        false.put(ByteOrder::BigEndian, &mut buf);
        assert_eq!(buf, [1, 0]);
        assert!(bool::get(ByteOrder::LittleEndian, &[7]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_names() {
        assert_eq!("\"big_endian\"", serde_json::to_string(&ByteOrder::BigEndian).unwrap());
        assert_eq!(ByteOrder::LittleEndian, serde_json::from_str::<ByteOrder>("\"little_endian\"").unwrap());
    }

}
