use crate::symbol::SymbolTable;

/// Number of addressable memory cells.
pub const MEMORY_SIZE: usize = 256;
/// First address handed out by `DEC`. Lower addresses belong to the program side.
pub const DATA_START: usize = 128;
/// Lower bound of the range checked by the overflow flag and `STR`.
pub const MIN_VALUE: i64 = -32768;
/// Upper bound of the range checked by the overflow flag and `STR`.
pub const MAX_VALUE: i64 = 32767;

/// Represents complete machine state during a session.
///
/// Values are never clamped: the overflow flag only records that the last arithmetic result
/// left the [`MIN_VALUE`]..=[`MAX_VALUE`] window.
#[derive(Clone, Debug)]
pub struct MachineState {
    /// Flat data memory, addresses `0..MEMORY_SIZE`.
    pub(crate) mem: Box<[i64; MEMORY_SIZE]>,
    /// Accumulator (A)
    pub(crate) acc: i64,
    /// Data register (B)
    pub(crate) data: i64,
    /// Index of the next program line to execute.
    ///
    /// May briefly be `-1` after a jump to address 0, since the controller increments after
    /// every instruction.
    pub(crate) pc: i64,
    pub(crate) zero: bool,
    pub(crate) overflow: bool,
    pub(crate) symbols: SymbolTable,
    /// Address the next `DEC` will bind.
    pub(crate) next_data: usize,
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineState {
    pub fn new() -> Self {
        Self {
            mem: Box::new([0; MEMORY_SIZE]),
            acc: 0,
            data: 0,
            pc: 0,
            zero: false,
            overflow: false,
            symbols: SymbolTable::new(),
            next_data: DATA_START,
        }
    }

    pub fn accumulator(&self) -> i64 {
        self.acc
    }

    pub fn data_register(&self) -> i64 {
        self.data
    }

    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn zero_flag(&self) -> bool {
        self.zero
    }

    pub fn overflow_flag(&self) -> bool {
        self.overflow
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn next_data_address(&self) -> usize {
        self.next_data
    }

    /// Panics if `address` is not below [`MEMORY_SIZE`].
    pub fn mem(&self, address: usize) -> i64 {
        self.mem[address]
    }

    /// Value stored at the address bound to `symbol`. Undeclared names read address 0.
    pub fn value_of(&self, symbol: &str) -> i64 {
        self.mem(self.symbols.get(symbol).unwrap_or(0))
    }

    /// Set zero flag iff `result` is zero.
    pub fn update_zero_flag(&mut self, result: i64) {
        self.zero = result == 0;
    }

    /// Set overflow flag iff `result` is outside the checked window.
    pub fn update_overflow_flag(&mut self, result: i64) {
        self.overflow = !in_bounds(result);
    }
}

/// Whether `value` lies within [`MIN_VALUE`]..=[`MAX_VALUE`].
pub fn in_bounds(value: i64) -> bool {
    (MIN_VALUE..=MAX_VALUE).contains(&value)
}
