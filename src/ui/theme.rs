use ratatui::style::Color;

/// Theme color palette defining all colors used in the application.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub primary: ColorSpec,
    pub accent: ColorSpec,

    // Text colors
    pub text: ColorSpec,
    pub text_muted: ColorSpec,

    // Status colors
    pub success: ColorSpec,
    pub warning: ColorSpec,
    pub error: ColorSpec,

    // UI element colors
    pub border_active: ColorSpec,
    pub border_normal: ColorSpec,
    pub entering: ColorSpec,
}

/// RGB color that can be converted to a terminal color.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSpec {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const fn rgb(r: u8, g: u8, b: u8) -> ColorSpec {
    ColorSpec { r, g, b }
}

impl ColorSpec {
    pub fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::rose_pine()
    }
}

impl Theme {
    pub fn rose_pine() -> Self {
        Theme {
            name: "rose-pine",
            primary: rgb(196, 167, 231),
            accent: rgb(235, 188, 186),
            text: rgb(224, 222, 244),
            text_muted: rgb(110, 106, 134),
            success: rgb(156, 207, 216),
            warning: rgb(246, 193, 119),
            error: rgb(235, 111, 146),
            border_active: rgb(196, 167, 231),
            border_normal: rgb(64, 61, 82),
            entering: rgb(49, 116, 143),
        }
    }

    pub fn rose_pine_dawn() -> Self {
        Theme {
            name: "rose-pine-dawn",
            primary: rgb(144, 122, 169),
            accent: rgb(215, 130, 126),
            text: rgb(87, 82, 121),
            text_muted: rgb(152, 147, 165),
            success: rgb(86, 148, 159),
            warning: rgb(234, 157, 52),
            error: rgb(180, 99, 122),
            border_active: rgb(144, 122, 169),
            border_normal: rgb(223, 218, 217),
            entering: rgb(40, 105, 131),
        }
    }

    pub fn dracula() -> Self {
        Theme {
            name: "dracula",
            primary: rgb(189, 147, 249),
            accent: rgb(255, 121, 198),
            text: rgb(248, 248, 242),
            text_muted: rgb(98, 114, 164),
            success: rgb(80, 250, 123),
            warning: rgb(241, 250, 140),
            error: rgb(255, 85, 85),
            border_active: rgb(189, 147, 249),
            border_normal: rgb(68, 71, 90),
            entering: rgb(139, 233, 253),
        }
    }

    pub fn tokyo_night() -> Self {
        Theme {
            name: "tokyo-night",
            primary: rgb(122, 162, 247),
            accent: rgb(187, 154, 247),
            text: rgb(192, 202, 245),
            text_muted: rgb(86, 95, 137),
            success: rgb(158, 206, 106),
            warning: rgb(224, 175, 104),
            error: rgb(247, 118, 142),
            border_active: rgb(122, 162, 247),
            border_normal: rgb(59, 66, 97),
            entering: rgb(125, 207, 255),
        }
    }

    /// Look up a theme by name.
    ///
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rose-pine" => Some(Self::rose_pine()),
            "rose-pine-dawn" => Some(Self::rose_pine_dawn()),
            "dracula" => Some(Self::dracula()),
            "tokyo-night" => Some(Self::tokyo_night()),
            _ => None,
        }
    }

    /// Get list of all available theme names.
    ///
    pub fn available_themes() -> [&'static str; 4] {
        ["rose-pine", "rose-pine-dawn", "dracula", "tokyo-night"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_theme_resolves() {
        for name in Theme::available_themes() {
            let theme = Theme::from_name(name).unwrap();
            assert_eq!(theme.name, name);
        }
        assert!(Theme::from_name("solarized").is_none());
    }

    #[test]
    fn color_conversion() {
        assert_eq!(rgb(1, 2, 3).to_color(), Color::Rgb(1, 2, 3));
    }
}
