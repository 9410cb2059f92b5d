use crate::{base::BaseType, value::Value};

/// Byte order used for multi-byte scalars. Single bytes are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn from_big_endian(big_endian: bool) -> Endian {
        if big_endian {
            Endian::Big
        } else {
            Endian::Little
        }
    }
}

/// A fixed-width byte buffer meant for reading.
///
/// Example usage:
///
/// ```
/// use brine_layout_schema::{ByteBuffer, Endian};
/// let mut bb = ByteBuffer::new(&[1, 0, 0, 0, 0xff, 0xff], Endian::Little);
/// assert_eq!(bb.read_i32(), Ok(1));
/// assert_eq!(bb.read_i16(), Ok(-1));
/// ```
///
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    index: usize,
    endian: Endian,
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice. The lifetime
    /// of the returned ByteBuffer must not outlive the lifetime of the byte
    /// slice.
    pub fn new(data: &'a [u8], endian: Endian) -> ByteBuffer<'a> {
        ByteBuffer {
            data,
            index: 0,
            endian,
        }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice. This starts
    /// off as 0 and ends up as `self.data().len()` when everything has been
    /// read.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Try to read `len` bytes starting at the current index.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ()> {
        let end = self.index.checked_add(len).ok_or(())?;
        if end > self.data.len() {
            Err(())
        } else {
            let value = &self.data[self.index..end];
            self.index = end;
            Ok(value)
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ()> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Try to read a bool stored as one byte. Any nonzero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, ()> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8, ()> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ()> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16, ()> {
        let bytes = self.read_array()?;
        Ok(match self.endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_i16(&mut self) -> Result<i16, ()> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32, ()> {
        let bytes = self.read_array()?;
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_i32(&mut self) -> Result<i32, ()> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> Result<u64, ()> {
        let bytes = self.read_array()?;
        Ok(match self.endian {
            Endian::Little => u64::from_le_bytes(bytes),
            Endian::Big => u64::from_be_bytes(bytes),
        })
    }

    pub fn read_i64(&mut self) -> Result<i64, ()> {
        Ok(self.read_u64()? as i64)
    }

    /// Try to read an IEEE-754 binary32 value.
    pub fn read_f32(&mut self) -> Result<f32, ()> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Try to read an IEEE-754 binary64 value.
    pub fn read_f64(&mut self) -> Result<f64, ()> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read one element of `base` as the matching [Value] variant.
    pub fn read_base(&mut self, base: BaseType) -> Result<Value, ()> {
        Ok(match base {
            BaseType::Bool => Value::Bool(self.read_bool()?),
            BaseType::U8 => Value::U8(self.read_u8()?),
            BaseType::I8 => Value::I8(self.read_i8()?),
            BaseType::U16 => Value::U16(self.read_u16()?),
            BaseType::I16 => Value::I16(self.read_i16()?),
            BaseType::U32 => Value::U32(self.read_u32()?),
            BaseType::I32 => Value::I32(self.read_i32()?),
            BaseType::U64 => Value::U64(self.read_u64()?),
            BaseType::I64 => Value::I64(self.read_i64()?),
            BaseType::Float => Value::Float(self.read_f32()?),
            BaseType::Double => Value::Double(self.read_f64()?),
        })
    }
}

/// A fixed-width byte buffer meant for writing.
///
/// Example usage:
///
/// ```
/// use brine_layout_schema::{ByteBufferMut, Endian};
/// let mut bb = ByteBufferMut::new(Endian::Big);
/// bb.write_u16(0x1234);
/// bb.write_zeros(2);
/// assert_eq!(bb.data(), [0x12, 0x34, 0, 0]);
/// ```
///
pub struct ByteBufferMut {
    data: Vec<u8>,
    endian: Endian,
}

impl ByteBufferMut {
    pub fn new(endian: Endian) -> ByteBufferMut {
        ByteBufferMut {
            data: vec![],
            endian,
        }
    }

    pub fn with_capacity(endian: Endian, capacity: usize) -> ByteBufferMut {
        ByteBufferMut {
            data: Vec::with_capacity(capacity),
            endian,
        }
    }

    /// Consumes the buffer, returning the written bytes.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.push(if value { 1 } else { 0 });
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn write_zeros(&mut self, len: usize) {
        self.data.resize(self.data.len() + len, 0);
    }

    pub fn write_u16(&mut self, value: u16) {
        match self.endian {
            Endian::Little => self.write_bytes(&value.to_le_bytes()),
            Endian::Big => self.write_bytes(&value.to_be_bytes()),
        }
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_u32(&mut self, value: u32) {
        match self.endian {
            Endian::Little => self.write_bytes(&value.to_le_bytes()),
            Endian::Big => self.write_bytes(&value.to_be_bytes()),
        }
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_u64(&mut self, value: u64) {
        match self.endian {
            Endian::Little => self.write_bytes(&value.to_le_bytes()),
            Endian::Big => self.write_bytes(&value.to_be_bytes()),
        }
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_u64(value as u64);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }

    /// Writes a zero element of the given base type.
    pub fn write_base_zero(&mut self, base: BaseType) {
        self.write_zeros(base.size());
    }
}

#[test]
fn read_bool() {
    let read = |bytes| ByteBuffer::new(bytes, Endian::Little).read_bool();
    assert_eq!(read(&[]), Err(()));
    assert_eq!(read(&[0]), Ok(false));
    assert_eq!(read(&[1]), Ok(true));
    assert_eq!(read(&[2]), Ok(true));
    assert_eq!(read(&[255]), Ok(true));
}

#[test]
fn read_bytes() {
    let read = |bytes, len| ByteBuffer::new(bytes, Endian::Little).read_bytes(len);
    assert_eq!(read(&[], 0), Ok(vec![].as_slice()));
    assert_eq!(read(&[], 1), Err(()));
    assert_eq!(read(&[0], 1), Ok(vec![0].as_slice()));
    assert_eq!(read(&[0], 2), Err(()));
    assert_eq!(read(&[0], usize::MAX), Err(()));

    let mut bb = ByteBuffer::new(&[1, 2, 3, 4, 5], Endian::Little);
    assert_eq!(bb.read_bytes(3), Ok(vec![1, 2, 3].as_slice()));
    assert_eq!(bb.read_bytes(2), Ok(vec![4, 5].as_slice()));
    assert_eq!(bb.read_bytes(1), Err(()));
}

#[test]
fn read_integers() {
    let le = |bytes| ByteBuffer::new(bytes, Endian::Little);
    let be = |bytes| ByteBuffer::new(bytes, Endian::Big);
    assert_eq!(le(&[0x34, 0x12]).read_u16(), Ok(0x1234));
    assert_eq!(be(&[0x12, 0x34]).read_u16(), Ok(0x1234));
    assert_eq!(le(&[0xff, 0xff]).read_i16(), Ok(-1));
    assert_eq!(le(&[0x12]).read_u16(), Err(()));
    assert_eq!(le(&[1, 0, 0, 0]).read_i32(), Ok(1));
    assert_eq!(be(&[0, 0, 0, 1]).read_i32(), Ok(1));
    assert_eq!(le(&[0xff, 0xff, 0xff, 0xff]).read_i32(), Ok(-1));
    assert_eq!(le(&[0xff, 0xff, 0xff, 0xff]).read_u32(), Ok(u32::MAX));
    assert_eq!(le(&[0x80]).read_i8(), Ok(-128));
    assert_eq!(
        be(&[0x80, 0, 0, 0, 0, 0, 0, 0]).read_i64(),
        Ok(i64::MIN)
    );
    assert_eq!(
        le(&[1, 2, 3, 4, 5, 6, 7, 8]).read_u64(),
        Ok(0x0807_0605_0403_0201)
    );
}

#[test]
fn read_floats() {
    let le = |bytes| ByteBuffer::new(bytes, Endian::Little);
    assert_eq!(le(&[0, 0, 0x80, 0x3f]).read_f32(), Ok(1.0));
    assert_eq!(
        ByteBuffer::new(&[0x3f, 0xf0, 0, 0, 0, 0, 0, 0], Endian::Big).read_f64(),
        Ok(1.0)
    );
    assert_eq!(le(&[0, 0, 0xc0, 0x7f]).read_f32().map(|f| f.is_nan()), Ok(true));
}

#[test]
fn read_base() {
    let data = [1, 0xfe, 0xff, 0, 0, 0x80, 0x3f];
    let mut bb = ByteBuffer::new(&data, Endian::Little);
    assert_eq!(bb.read_base(BaseType::Bool), Ok(Value::Bool(true)));
    assert_eq!(bb.read_base(BaseType::I16), Ok(Value::I16(-2)));
    assert_eq!(bb.read_base(BaseType::Float), Ok(Value::Float(1.0)));
    assert_eq!(bb.read_base(BaseType::U8), Err(()));

    let mut bb = ByteBuffer::new(&[0, 0, 0, 0, 0, 0, 0, 7], Endian::Big);
    assert_eq!(bb.read_base(BaseType::U64), Ok(Value::U64(7)));
}

#[cfg(test)]
fn write_once(endian: Endian, cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new(endian);
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_integers() {
    assert_eq!(write_once(Endian::Little, |bb| bb.write_bool(true)), [1]);
    assert_eq!(write_once(Endian::Little, |bb| bb.write_i8(-1)), [255]);
    assert_eq!(write_once(Endian::Little, |bb| bb.write_u16(0x1234)), [0x34, 0x12]);
    assert_eq!(write_once(Endian::Big, |bb| bb.write_u16(0x1234)), [0x12, 0x34]);
    assert_eq!(
        write_once(Endian::Little, |bb| bb.write_i32(-1)),
        [0xff, 0xff, 0xff, 0xff]
    );
    assert_eq!(write_once(Endian::Big, |bb| bb.write_i32(1)), [0, 0, 0, 1]);
    assert_eq!(
        write_once(Endian::Little, |bb| bb.write_u64(0x0807_0605_0403_0201)),
        [1, 2, 3, 4, 5, 6, 7, 8]
    );
    assert_eq!(
        write_once(Endian::Big, |bb| bb.write_i64(i64::MIN)),
        [0x80, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn write_floats() {
    assert_eq!(
        write_once(Endian::Little, |bb| bb.write_f32(1.0)),
        [0, 0, 0x80, 0x3f]
    );
    assert_eq!(
        write_once(Endian::Big, |bb| bb.write_f64(-2.0)),
        [0xc0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn write_sequence() {
    let mut bb = ByteBufferMut::new(Endian::Little);
    bb.write_u8(7);
    bb.write_zeros(3);
    bb.write_u32(0xdead_beef);
    bb.write_base_zero(BaseType::U16);
    assert_eq!(bb.len(), 10);
    assert_eq!(bb.data(), [7, 0, 0, 0, 0xef, 0xbe, 0xad, 0xde, 0, 0]);
}
