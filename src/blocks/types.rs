// ============================================
// Block Types - Data-Driven Architecture
// ============================================
// BlockType = numeric_id блока. Все данные из JSON.

/// BlockType - просто numeric_id блока
pub type BlockType = u16;

// Константы встроенного набора (соответствуют numeric_id в JSON)
pub const AIR: BlockType = 0;
pub const STONE: BlockType = 1;
pub const DIRT: BlockType = 2;
pub const GRASS: BlockType = 3;
pub const SAND: BlockType = 4;
pub const GRAVEL: BlockType = 5;
pub const BEDROCK: BlockType = 7;
pub const COBBLESTONE: BlockType = 10;
pub const GRANITE: BlockType = 12;
pub const COAL_ORE: BlockType = 20;
pub const DIAMOND_ORE: BlockType = 23;
pub const OAK_PLANKS: BlockType = 31;
pub const OAK_LEAVES: BlockType = 32;
pub const WATER: BlockType = 50;
pub const LAVA: BlockType = 51;
pub const ICE: BlockType = 52;
pub const BRICKS: BlockType = 60;
pub const GLASS: BlockType = 63;
pub const IRON_BLOCK: BlockType = 70;
pub const SPAWNER: BlockType = 80;
pub const END_PORTAL_FRAME: BlockType = 81;
pub const TORCH: BlockType = 90;
pub const OAK_STAIRS: BlockType = 91;
pub const ANVIL: BlockType = 100;
