// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::num::ParseIntError;

/// Parses a song code. Accepts `0x` prefixed hex or plain decimal.
pub fn parse_code(code: &str) -> Result<u8, ParseIntError> {
    let code = code.trim();
    match code
        .strip_prefix("0x")
        .or_else(|| code.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => code.parse::<u8>(),
    }
}

#[cfg(test)]
mod test {
    use crate::util::parse_code;

    #[test]
    fn test_parse_code() {
        assert_eq!(Ok(0xFF), parse_code("0xFF"));
        assert_eq!(Ok(0x11), parse_code("0x11"));
        assert_eq!(Ok(0x91), parse_code(" 0X91 "));
        assert_eq!(Ok(255), parse_code("255"));
        assert_eq!(Ok(17), parse_code("17"));
        assert!(parse_code("256").is_err());
        assert!(parse_code("0x100").is_err());
        assert!(parse_code("storm").is_err());
        assert!(parse_code("").is_err());
    }
}
