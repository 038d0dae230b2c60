// Controller RAM write commands

// IL0373 / IL91874 family
pub const IL0373_DATA_START_TRANSMISSION_1: u8 = 0x10; // Black/white plane
pub const IL0373_DATA_START_TRANSMISSION_2: u8 = 0x13; // Red/yellow plane

// SSD1675 / SSD1680 family
pub const SSD16XX_WRITE_RAM_BW: u8 = 0x24; // Write to BW RAM
pub const SSD16XX_WRITE_RAM_RED: u8 = 0x26; // Write to RED RAM

// 23K-series SPI SRAM
pub const SRAM_READ: u8 = 0x03; // Read from memory array
pub const SRAM_WRITE: u8 = 0x02; // Write to memory array
pub const SRAM_WRSR: u8 = 0x01; // Write status register
pub const SRAM_SEQUENTIAL_MODE: u8 = 0x40; // Status: sequential operation
