//! Binary encode/decode for `lrk_core::Tables<K>`. The layout is a flat,
//! little-endian byte stream, written and read by hand the way
//! `sherpa-bytecode::build_bytecode` assembles its own instruction stream
//! with `insert_u32_le`-style helpers, rather than through `serde`/`bincode`.

use lrk_core::{
  kstring::KString,
  symbol::SymbolTable,
  tables::{Action, TableProduction, Tables},
  LrkError, LrkResult,
};

struct Writer {
  buf: Vec<u8>,
}

impl Writer {
  fn new() -> Self {
    Writer { buf: Vec::new() }
  }

  fn write_u8(&mut self, v: u8) {
    self.buf.push(v);
  }

  fn write_i32(&mut self, v: i32) {
    self.buf.extend_from_slice(&v.to_le_bytes());
  }

  fn write_u32(&mut self, v: u32) {
    self.buf.extend_from_slice(&v.to_le_bytes());
  }

  fn write_u64(&mut self, v: u64) {
    self.buf.extend_from_slice(&v.to_le_bytes());
  }

  fn write_bytes(&mut self, bytes: &[u8]) {
    self.buf.extend_from_slice(bytes);
  }
}

struct Reader<'a> {
  buf: &'a [u8],
  pos: usize,
}

impl<'a> Reader<'a> {
  fn new(buf: &'a [u8]) -> Self {
    Reader { buf, pos: 0 }
  }

  fn take(&mut self, len: usize) -> LrkResult<&'a [u8]> {
    if self.pos + len > self.buf.len() {
      return Err(LrkError::IOError("unexpected end of table data".into()));
    }
    let slice = &self.buf[self.pos..self.pos + len];
    self.pos += len;
    Ok(slice)
  }

  fn read_u8(&mut self) -> LrkResult<u8> {
    Ok(self.take(1)?[0])
  }

  fn read_i32(&mut self) -> LrkResult<i32> {
    Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
  }

  fn read_u32(&mut self) -> LrkResult<u32> {
    Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
  }

  fn read_u64(&mut self) -> LrkResult<u64> {
    Ok(u64::from_le_bytes(self.take(8)?.try_into().unwrap()))
  }

  fn read_bytes(&mut self, len: usize) -> LrkResult<&'a [u8]> {
    self.take(len)
  }
}

/// Encodes a built `Tables<K>` into the on-disk layout described in
/// SPEC_FULL.md §4.4. Lengths are narrowed with `try_into` rather than `as`
/// so a table too large for the wire format's `u32` counts fails loudly with
/// `CorruptTable` instead of silently truncating.
pub fn encode<const K: usize>(tables: &Tables<K>) -> LrkResult<Vec<u8>> {
  let mut w = Writer::new();

  w.write_i32(K as i32);

  let names = tables.symbols.names();
  w.write_u64(names.len() as u64);
  let total_name_bytes: u64 = names.iter().map(|n| n.len() as u64).sum();
  w.write_u64(total_name_bytes);
  for name in names {
    w.write_u32(u32::try_from(name.len())?);
    w.write_bytes(name.as_bytes());
  }

  w.write_u64(tables.productions.len() as u64);
  let total_rhs_ints: u64 = tables.productions.iter().map(|p| p.rhs.len() as u64).sum();
  w.write_u64(total_rhs_ints);
  for production in &tables.productions {
    w.write_i32(production.lhs as i32);
    w.write_u32(u32::try_from(production.rhs.len())?);
    for &sym in &production.rhs {
      w.write_i32(sym as i32);
    }
  }

  w.write_u64(tables.goto.len() as u64);
  for row in &tables.goto {
    w.write_u32(u32::try_from(row.len())?);
    for (&sym, &dst) in row {
      w.write_i32(sym as i32);
      w.write_u32(dst);
    }
  }

  w.write_u64(tables.action.len() as u64);
  for row in &tables.action {
    w.write_u32(u32::try_from(row.len())?);
    for (key, &action) in row {
      for &sym in key.syms() {
        w.write_i32(sym as i32);
      }
      w.write_u8(key.len() as u8);
      w.write_u32(action.to_code());
    }
  }

  Ok(w.buf)
}

/// Decodes a `Tables<K>` previously produced by [`encode`]. `K` must match
/// the `k` stored in the file, else `KMismatch`.
pub fn decode<const K: usize>(bytes: &[u8]) -> LrkResult<Tables<K>> {
  let mut r = Reader::new(bytes);

  let file_k = r.read_i32()?;
  if file_k != K as i32 {
    return Err(LrkError::KMismatch { expected: K as i32, found: file_k });
  }

  let token_count = r.read_u64()? as usize;
  let _total_name_bytes = r.read_u64()?;
  let mut names = Vec::with_capacity(token_count);
  for _ in 0..token_count {
    let len = r.read_u32()? as usize;
    let bytes = r.read_bytes(len)?;
    let name = std::str::from_utf8(bytes)
      .map_err(|_| LrkError::CorruptTable("symbol name is not valid utf-8".into()))?
      .to_string();
    names.push(name);
  }
  let symbols = SymbolTable::from_names(names);

  let production_count = r.read_u64()? as usize;
  let _total_rhs_ints = r.read_u64()?;
  let mut productions = Vec::with_capacity(production_count);
  for _ in 0..production_count {
    let lhs = r.read_i32()? as u32;
    if lhs as usize >= token_count {
      return Err(LrkError::CorruptTable(format!("production references out-of-range lhs symbol {lhs}")));
    }
    let rhs_len = r.read_u32()? as usize;
    let mut rhs = Vec::with_capacity(rhs_len);
    for _ in 0..rhs_len {
      let sym = r.read_i32()? as u32;
      if sym as usize >= token_count {
        return Err(LrkError::CorruptTable(format!("production references out-of-range rhs symbol {sym}")));
      }
      rhs.push(sym);
    }
    productions.push(TableProduction { lhs, rhs });
  }

  let num_states = r.read_u64()? as usize;
  let mut goto = Vec::with_capacity(num_states);
  for _ in 0..num_states {
    let count = r.read_u32()? as usize;
    let mut row = std::collections::BTreeMap::new();
    for _ in 0..count {
      let sym = r.read_i32()? as u32;
      if sym as usize >= token_count {
        return Err(LrkError::CorruptTable(format!("goto entry references out-of-range symbol {sym}")));
      }
      let dst = r.read_u32()?;
      if dst as usize >= num_states {
        return Err(LrkError::CorruptTable(format!("goto entry targets out-of-range state {dst}")));
      }
      row.insert(sym, dst);
    }
    goto.push(row);
  }

  let num_states_again = r.read_u64()? as usize;
  if num_states_again != num_states {
    return Err(LrkError::CorruptTable(format!(
      "state count mismatch: goto table has {num_states}, action table declares {num_states_again}"
    )));
  }

  let mut action = Vec::with_capacity(num_states);
  for _ in 0..num_states {
    let count = r.read_u32()? as usize;
    let mut row = std::collections::BTreeMap::new();
    for _ in 0..count {
      let mut syms = [0u32; K];
      for slot in syms.iter_mut() {
        *slot = r.read_i32()? as u32;
      }
      let len = r.read_u8()?;
      if len as usize > K {
        return Err(LrkError::CorruptTable(format!("lookahead length {len} exceeds k={K}")));
      }
      let key = KString::from_raw(syms, len);
      if let Some(&sym) = key.as_slice().iter().find(|&&sym| sym as usize >= token_count) {
        return Err(LrkError::CorruptTable(format!("action key references out-of-range symbol {sym}")));
      }
      let code = r.read_u32()?;
      let act = Action::from_code(code);
      if let Action::Reduce(rule_id) = act {
        if rule_id as usize >= production_count {
          return Err(LrkError::CorruptTable(format!("reduce action references out-of-range rule {rule_id}")));
        }
      }
      row.insert(key, act);
    }
    action.push(row);
  }

  Ok(Tables { symbols, productions, goto, action })
}
