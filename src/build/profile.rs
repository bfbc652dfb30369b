use clap::ValueEnum;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum EngineTarget {
    #[default]
    CustomEdition,
    Retail,
    Demo,
    Xbox,
    Native,
}

/// Limits and conversion policies of one target engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProfile {
    pub target: EngineTarget,
    pub name: &'static str,
    pub engine_id: u32,
    /// Address the tag data region is loaded at.
    pub tag_data_address: u32,
    /// Resident memory shared by the tag data and the active BSP.
    pub tag_data_memory: usize,
    pub max_file_size: usize,
    pub max_tag_count: usize,
    pub max_script_nodes: usize,
    pub compressed_bsp_vertices: bool,
    pub swizzled_bitmaps: bool,
    pub legacy_hardware: bool,
}

impl EngineProfile {
    pub fn for_target(target: EngineTarget) -> EngineProfile {
        match target {
            EngineTarget::CustomEdition => EngineProfile {
                target,
                name: "Custom Edition",
                engine_id: 609,
                tag_data_address: 0x40440000,
                tag_data_memory: 0x1700000,
                max_file_size: 0x18000000,
                max_tag_count: 65535,
                max_script_nodes: 19001,
                compressed_bsp_vertices: false,
                swizzled_bitmaps: false,
                legacy_hardware: true,
            },
            EngineTarget::Retail => EngineProfile {
                name: "Retail",
                engine_id: 7,
                ..EngineProfile::for_target(EngineTarget::CustomEdition)
            }
            .retarget(target),
            EngineTarget::Demo => EngineProfile {
                name: "Demo",
                engine_id: 6,
                tag_data_address: 0x4BF10000,
                ..EngineProfile::for_target(EngineTarget::CustomEdition)
            }
            .retarget(target),
            EngineTarget::Xbox => EngineProfile {
                target,
                name: "Xbox",
                engine_id: 5,
                tag_data_address: 0x803A6000,
                tag_data_memory: 0x1600000,
                max_file_size: 0x8000000,
                max_tag_count: 65535,
                max_script_nodes: 19001,
                compressed_bsp_vertices: true,
                swizzled_bitmaps: true,
                legacy_hardware: true,
            },
            EngineTarget::Native => EngineProfile {
                target,
                name: "Native",
                engine_id: 0x1A86,
                tag_data_address: 0x40000000,
                tag_data_memory: 0x10000000,
                max_file_size: u32::MAX as usize,
                max_tag_count: 65535,
                max_script_nodes: 32767,
                compressed_bsp_vertices: false,
                swizzled_bitmaps: false,
                legacy_hardware: false,
            },
        }
    }

    fn retarget(mut self, target: EngineTarget) -> EngineProfile {
        self.target = target;
        self
    }

    pub fn with_tag_data_memory(mut self, tag_data_memory: usize) -> EngineProfile {
        self.tag_data_memory = tag_data_memory;
        self
    }

    pub fn with_max_tag_count(mut self, max_tag_count: usize) -> EngineProfile {
        self.max_tag_count = max_tag_count;
        self
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        EngineProfile::for_target(EngineTarget::default())
    }
}
