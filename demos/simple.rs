use thrift_openapi::convert;

fn main() {
    let idl = r#"
        struct User {
            1: string name,
            2: optional string email
        }

        service UserService {
            User getUser(1: i64 id) (api.get="/users/{id}");
        }
    "#;

    let result = convert(idl);
    for skipped in &result.skipped {
        eprintln!("warning: {skipped}");
    }
    match result.to_json() {
        Ok(json_output) => println!("Generated OpenAPI document:\n{json_output}"),
        Err(e) => eprintln!("Failed to render document: {e:?}"),
    }
}
