use super::errors::GameError;
use crate::core::entities::Coords;

/// Number of column letters available to the text codec (`A`..`S`).
pub const MAX_COLUMNS: i32 = 19;

/// Letter of a column, `?` for columns the codec has no letter for.
pub fn get_column_name(col: i32) -> char {
    if (0..MAX_COLUMNS).contains(&col) {
        (b'A' + col as u8) as char
    } else {
        '?'
    }
}

pub fn get_column_number(col: char) -> Option<i32> {
    if !col.is_ascii_uppercase() {
        return None;
    }
    let col_nr = col as i32 - 'A' as i32;
    if col_nr < MAX_COLUMNS {
        Some(col_nr)
    } else {
        None
    }
}

pub fn format_coords(coords: Coords) -> String {
    format!("{}{}", get_column_name(coords.x), coords.y + 1)
}

/// Parses a point such as `D14`: a column letter followed by a 1-based row.
pub fn parse_coords(input: &str) -> Result<Coords, GameError> {
    let input = input.trim();
    let mut chars = input.chars();

    let col = chars
        .next()
        .map(|c| c.to_ascii_uppercase())
        .ok_or_else(|| GameError::InvalidCoords(input.to_string()))?;
    let x = get_column_number(col)
        .ok_or_else(|| GameError::InvalidCoords(format!("{} is out of range", col)))?;

    let number = chars.as_str();
    let not_a_number = || GameError::InvalidCoords(format!("{} is not a number", number));
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_a_number());
    }
    let row: i32 = number.parse().map_err(|_| not_a_number())?;

    if row < 1 {
        return Err(GameError::InvalidCoords(format!("{} is out of range", row)));
    }

    Ok(Coords::from(x, row - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_column_name_number_mapping() {
        let char_table = [
            ('A', 0),
            ('B', 1),
            ('C', 2),
            ('H', 7),
            ('I', 8),
            ('J', 9),
            ('S', 18),
        ];

        for (char_name, char_nr) in char_table.iter() {
            assert_eq!(*char_name, get_column_name(*char_nr));
            assert_eq!(Some(*char_nr), get_column_number(*char_name));
        }

        assert_eq!(None, get_column_number('T'));
        assert_eq!(None, get_column_number('1'));
        assert_eq!('?', get_column_name(19));
        assert_eq!('?', get_column_name(200));
        assert_eq!('?', get_column_name(-1));
    }

    #[test]
    fn parses_text_coordinates() {
        assert_eq!(Ok(Coords::from(3, 13)), parse_coords("D14"));
        assert_eq!(Ok(Coords::from(0, 0)), parse_coords("a1"));
        assert_eq!("D14", format_coords(Coords::from(3, 13)));

        let bad_inputs = [
            "", "D", "T4", "4D", "D0", "Dx", "D+5", "D-5", "D 5", "D1x", "D99999999999",
        ];
        for bad in bad_inputs.iter() {
            assert!(parse_coords(bad).is_err(), "{} should not parse", bad);
        }
    }
}
