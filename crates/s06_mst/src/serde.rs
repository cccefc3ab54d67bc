use ::serde::ser::SerializeMap;
use ::serde::{Serialize, Serializer};

use crate::text;
use crate::types::StringTable;

#[derive(Serialize)]
struct Message<'a> {
    index: usize,
    name: &'a str,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<&'a str>,
}

impl Serialize for StringTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let messages: Vec<Message> = self
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| Message {
                index,
                name: &entry.name,
                text: text::utf16_to_utf8(&entry.text),
                placeholder: self.placeholder(index),
            })
            .collect();

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", self.name())?;
        map.serialize_entry("endianness", if self.big_endian() { "B" } else { "L" })?;
        map.serialize_entry("messages", &messages)?;
        map.end()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use widestring::U16String;

    use crate::types::{StringEntry, StringTable};

    #[test]
    fn serializes_to_ordered_messages() {
        let mut table = StringTable::new("T", true);
        table.push_entry(StringEntry::new("MSG".into(), U16String::from_str("Hi")));
        table.set_placeholder(0, "icon");

        let json = serde_json::to_string(&table).unwrap();
        assert_str_eq!(
            json,
            "{\"name\":\"T\",\"endianness\":\"B\",\"messages\":\
             [{\"index\":0,\"name\":\"MSG\",\"text\":\"Hi\",\"placeholder\":\"icon\"}]}"
        );
    }
}
