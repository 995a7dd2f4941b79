use oas_synth_core::{build_document, synthesize, AppError, ApiDefinition, SynthesisOptions};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const CORE_API: &str = include_str!("fixtures/core_api.yaml");
const BASE_URL: &str = "https://api.example.com/api/v1";

fn core_api() -> ApiDefinition {
    ApiDefinition::from_yaml(CORE_API).unwrap()
}

fn document() -> Value {
    build_document(&core_api(), BASE_URL, None, &SynthesisOptions::default()).unwrap()
}

fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect()
}

fn success_schema<'a>(doc: &'a Value, path: &str, method: &str) -> &'a Value {
    &doc["paths"][path][method]["responses"]["200"]["content"]["application/json"]["schema"]
}

#[test]
fn test_paths_are_grouped_by_first_tag() {
    let doc = document();
    assert_eq!(
        keys(&doc["paths"]),
        vec![
            "/time_formatting/incredibly/super/duper/long/format",
            "/example/format",
            "/example/format_multiple",
            "/paginated",
            "/time/now",
            "/test/{object}",
            "/time/formatting/incredibly/super/duper/long/format",
            "/time/formatting/format",
        ]
    );
    assert!(doc["paths"].get("/legacy").is_none());
}

#[test]
fn test_colliding_operation_ids_fall_back_to_abbreviated_path() {
    let doc = document();
    assert_eq!(
        doc["paths"]["/time_formatting/incredibly/super/duper/long/format"]["get"]["operationId"],
        json!("get:time_formatting_incredibly_super_duper_long_format")
    );
    assert_eq!(
        doc["paths"]["/time/formatting/incredibly/super/duper/long/format"]["get"]["operationId"],
        json!("get:t_f_i_s_d_l_f")
    );
    assert_eq!(
        doc["paths"]["/test/{object}"]["post"]["operationId"],
        json!("post:test_object")
    );
}

#[test]
fn test_include_spec_projects_a_partial_component() {
    let doc = document();
    let schema = success_schema(&doc, "/test/{object}", "get");

    assert_eq!(
        schema["properties"]["time"],
        json!({
            "allOf": [{ "$ref": "#/components/schemas/GetTestObject200ResponseTime" }],
            "nullable": true
        })
    );
    assert_eq!(schema["required"], json!(["object_id"]));

    let schemas = &doc["components"]["schemas"];
    let partial = &schemas["GetTestObject200ResponseTime"];
    assert_eq!(keys(&partial["properties"]), vec!["unix", "day_of_week", "year"]);
    assert_eq!(
        partial["properties"]["day_of_week"],
        json!({ "$ref": "#/components/schemas/Day" })
    );
    assert_eq!(
        partial["properties"]["year"],
        json!({ "$ref": "#/components/schemas/GetTestObject200ResponseTimePartYear" })
    );
    assert_eq!(
        schemas["GetTestObject200ResponseTimePartYear"]["properties"],
        json!({ "as_string": { "type": "string" } })
    );

    // The full component is still registered by the unrestricted field on time/now.
    assert_eq!(
        keys(&schemas["Time"]["properties"]),
        vec!["unix", "day_of_week", "full", "year", "as_array", "as_array_of_objects", "month"]
    );
}

#[test]
fn test_include_spec_on_array_field() {
    let doc = document();
    let schema = success_schema(&doc, "/example/format_multiple", "post");
    assert_eq!(
        schema["properties"]["times"],
        json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/PostExampleFormatMultiple200ResponseTimes" }
        })
    );

    let schemas = &doc["components"]["schemas"];
    let partial = &schemas["PostExampleFormatMultiple200ResponseTimes"];
    assert_eq!(
        keys(&partial["properties"]),
        vec!["unix", "year", "as_array_of_objects"]
    );
    assert_eq!(
        partial["properties"]["as_array_of_objects"]["items"],
        json!({ "$ref": "#/components/schemas/PostExampleFormatMultiple200ResponseTimesPartAsArrayOfObjects" })
    );
    assert_eq!(
        keys(&schemas["PostExampleFormatMultiple200ResponseTimesPartAsArrayOfObjects"]["properties"]),
        vec!["as_integer"]
    );
}

#[test]
fn test_polymorph_fields() {
    let doc = document();
    let schema = success_schema(&doc, "/time/now", "get");
    assert_eq!(
        schema["properties"]["my_polymorph"],
        json!({
            "oneOf": [
                { "$ref": "#/components/schemas/MonthLong" },
                { "$ref": "#/components/schemas/MonthShort" }
            ],
            "description": "A polymorphic field!"
        })
    );
    assert_eq!(
        schema["properties"]["my_partial_polymorph"],
        json!({
            "allOf": [{ "$ref": "#/components/schemas/GetTimeNow200ResponseMyPartialPolymorph" }],
            "nullable": true
        })
    );
    assert_eq!(
        keys(&doc["components"]["schemas"]["GetTimeNow200ResponseMyPartialPolymorph"]["properties"]),
        vec!["number"]
    );
}

#[test]
fn test_lookup_argument_set_fans_out_into_query_parameters() {
    let doc = document();
    let params = doc["paths"]["/test/{object}"]["get"]["parameters"]
        .as_array()
        .unwrap();
    let names: Vec<&str> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["object", "object[id]", "object[permalink]", "scalar"]);

    assert_eq!(params[0]["in"], json!("path"));
    assert_eq!(
        params[1]["description"],
        json!("All 'object[]' params are mutually exclusive, only one can be provided.")
    );
    assert_eq!(
        params[2]["description"],
        json!("The permalink of the object to look up All 'object[]' params are mutually exclusive, only one can be provided.")
    );
    assert!(params[1].get("required").is_none());
    assert_eq!(params[3]["required"], json!(true));
}

#[test]
fn test_nested_argument_set_is_skipped_in_query() {
    let doc = document();
    let params = doc["paths"]["/time_formatting/incredibly/super/duper/long/format"]["get"]
        ["parameters"]
        .as_array()
        .unwrap();
    let names: Vec<&str> = params.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["time[unix]", "time[string]", "timezone"]);
    assert_eq!(
        params[2]["schema"],
        json!({ "$ref": "#/components/schemas/TimeZone" })
    );
}

#[test]
fn test_pagination_arguments() {
    let doc = document();
    let params = doc["paths"]["/paginated"]["get"]["parameters"]
        .as_array()
        .unwrap();
    assert_eq!(params[0]["name"], json!("page"));
    assert_eq!(params[0]["schema"]["default"], json!(1));
    assert_eq!(params[1]["name"], json!("per_page"));
    assert_eq!(params[1]["schema"]["default"], json!(30));
}

#[test]
fn test_request_body_for_post() {
    let doc = document();
    let body = &doc["paths"]["/test/{object}"]["post"]["requestBody"]["content"]
        ["application/json"]["schema"];
    assert_eq!(
        body["properties"]["object"],
        json!({ "$ref": "#/components/schemas/ObjectLookup" })
    );
    assert_eq!(body["required"], json!(["object", "scalar"]));
    assert!(doc["paths"]["/test/{object}"]["get"].get("requestBody").is_none());
}

#[test]
fn test_errors_are_deduplicated_and_grouped_by_status() {
    let doc = document();
    let responses = &doc["paths"]["/test/{object}"]["get"]["responses"];
    assert_eq!(keys(responses), vec!["200", "400", "403", "404"]);

    let group = "AnotherInvalidTestSomethingVeryLongProblemBoomSomethingWrong";
    assert_eq!(
        responses["400"],
        json!({ "$ref": format!("#/components/responses/{}Response", group) })
    );
    assert_eq!(
        responses["403"],
        json!({ "$ref": "#/components/responses/APIAuthenticatorInvalidTokenResponse" })
    );

    let one_of = doc["components"]["schemas"][group]["oneOf"].as_array().unwrap();
    let codes: Vec<&Value> = one_of
        .iter()
        .map(|envelope| &envelope["properties"]["code"]["enum"][0])
        .collect();
    assert_eq!(
        codes,
        vec![
            &json!("something_wrong"),
            &json!("invalid_test"),
            &json!("so_many_problems"),
            &json!("another_invalid_test"),
            &json!("really_wrong"),
        ]
    );
    assert_eq!(
        doc["components"]["responses"][format!("{}Response", group)]["description"],
        json!("One of: something_wrong, invalid_test, so_many_problems, another_invalid_test, really_wrong")
    );
}

#[test]
fn test_controller_and_lookup_errors() {
    let doc = document();
    let responses = &doc["paths"]["/example/format"]["post"]["responses"];
    assert_eq!(keys(responses), vec!["200", "400", "403", "404", "429"]);
    assert_eq!(
        responses["400"],
        json!({ "$ref": "#/components/responses/InvalidTimeSomethingWrongResponse" })
    );

    let rate_limit = &doc["components"]["responses"]["RateLimitReachedResponse"];
    assert_eq!(
        rate_limit["description"],
        json!("You have reached the rate limit for this type of request")
    );
    assert_eq!(
        rate_limit["content"]["application/json"]["schema"]["properties"]["detail"],
        json!({ "$ref": "#/components/schemas/RateLimitReached" })
    );

    // Errors without fields carry an inline detail object.
    let not_found = &doc["components"]["responses"]["ObjectNotFoundResponse"];
    assert_eq!(
        not_found["content"]["application/json"]["schema"]["properties"]["detail"],
        json!({ "type": "object" })
    );
}

#[test]
fn test_endpoint_authenticator_errors() {
    let doc = document();
    let responses = &doc["paths"]["/time/now"]["get"]["responses"];
    assert_eq!(keys(responses), vec!["200", "403", "503"]);
}

#[test]
fn test_tags_and_tag_groups() {
    let doc = document();
    assert_eq!(
        doc["paths"]["/time/formatting/format"]["post"]["tags"],
        json!(["Time functions", "Formatting"])
    );
    assert_eq!(
        doc["tags"],
        json!([
            { "name": "Core" },
            { "name": "Formatting" },
            { "name": "Time functions", "description": "Everything related to time elements" }
        ])
    );
    assert_eq!(
        doc["x-tagGroups"],
        json!([
            { "name": "Core", "tags": ["Core"] },
            { "name": "Time functions", "tags": ["Formatting", "Time functions"] }
        ])
    );
}

#[test]
fn test_scopes_and_security() {
    let doc = document();
    assert_eq!(
        doc["paths"]["/time/now"]["get"]["description"],
        json!("Returns the current time\n\n## Scopes\n\n- `time`\n- `time:now`")
    );
    assert_eq!(
        doc["components"]["securitySchemes"],
        json!({ "MainAuthenticator": { "scheme": "bearer", "type": "http" } })
    );
    assert_eq!(doc["security"], json!([{ "MainAuthenticator": [] }]));
}

#[test]
fn test_output_is_deterministic() {
    let api = core_api();
    let options = SynthesisOptions::default();
    let first = synthesize(&api, BASE_URL, Some("Core"), &options).unwrap();
    let second = synthesize(&api, BASE_URL, Some("Core"), &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_include_field_aborts() {
    let yaml = CORE_API.replace(
        "include: \"unix,year[as_string],as_array_of_objects[as_integer]\"",
        "include: \"unix,century\"",
    );
    let api = ApiDefinition::from_yaml(&yaml).unwrap();
    let err = build_document(&api, BASE_URL, None, &SynthesisOptions::default()).unwrap_err();
    assert!(matches!(err, AppError::UnknownIncludeField { ref field, .. } if field == "century"));
}

#[test]
fn test_unknown_scalar_aborts() {
    let yaml = CORE_API.replace("object_id: { type: string }", "object_id: { type: uuid }");
    let api = ApiDefinition::from_yaml(&yaml).unwrap();
    let err = build_document(&api, BASE_URL, None, &SynthesisOptions::default()).unwrap_err();
    assert!(matches!(err, AppError::UnknownScalar { ref kind, .. } if kind == "uuid"));
}

#[test]
fn test_same_named_errors_in_different_namespaces_stay_distinct() {
    let api = ApiDefinition::from_yaml(
        r#"
id: CoreAPI/Base
errors:
  CoreAPI/ArgumentSets/UserLookup/NotFound:
    code: user_not_found
    http_status: 404
  CoreAPI/ArgumentSets/ZoneLookup/NotFound:
    code: zone_not_found
    http_status: 404
types:
  CoreAPI/ArgumentSets/UserLookup:
    kind: argument_set
    lookup: true
    arguments:
      id: { type: string }
    potential_errors: [CoreAPI/ArgumentSets/UserLookup/NotFound]
  CoreAPI/ArgumentSets/ZoneLookup:
    kind: argument_set
    lookup: true
    arguments:
      id: { type: string }
    potential_errors: [CoreAPI/ArgumentSets/ZoneLookup/NotFound]
endpoints:
  CoreAPI/Endpoints/ShowUser:
    arguments:
      user: { type: CoreAPI/ArgumentSets/UserLookup }
  CoreAPI/Endpoints/ShowZone:
    arguments:
      zone: { type: CoreAPI/ArgumentSets/ZoneLookup }
routes:
  - { method: get, path: users/:user, endpoint: CoreAPI/Endpoints/ShowUser }
  - { method: get, path: zones/:zone, endpoint: CoreAPI/Endpoints/ShowZone }
"#,
    )
    .unwrap();
    let doc = build_document(&api, BASE_URL, None, &SynthesisOptions::default()).unwrap();

    assert_eq!(
        doc["paths"]["/users/{user}"]["get"]["responses"]["404"],
        json!({ "$ref": "#/components/responses/NotFoundResponse" })
    );
    assert_eq!(
        doc["paths"]["/zones/{zone}"]["get"]["responses"]["404"],
        json!({ "$ref": "#/components/responses/CoreAPI_ArgumentSets_ZoneLookup_NotFoundResponse" })
    );
    let responses = &doc["components"]["responses"];
    assert_eq!(
        responses["NotFoundResponse"]["content"]["application/json"]["schema"]["properties"]["code"]["enum"],
        json!(["user_not_found"])
    );
    assert_eq!(
        responses["CoreAPI_ArgumentSets_ZoneLookup_NotFoundResponse"]["content"]["application/json"]
            ["schema"]["properties"]["code"]["enum"],
        json!(["zone_not_found"])
    );
}

#[test]
fn test_error_groups_with_the_same_truncated_id_stay_distinct() {
    let api = ApiDefinition::from_yaml(
        r#"
id: CoreAPI/Base
errors:
  CoreAPI/Errors/AccountSuspendedForReview: { code: account_suspended, http_status: 400 }
  CoreAPI/Errors/BillingDetailsAreMissing: { code: billing_missing, http_status: 400 }
  CoreAPI/Errors/CardWasDeclinedByIssuer: { code: card_declined, http_status: 400 }
  CoreAPI/Errors/YearlyQuotaIsExhausted: { code: quota_exhausted, http_status: 400 }
  CoreAPI/Errors/ZoneIsNotAvailableHere: { code: zone_unavailable, http_status: 400 }
endpoints:
  CoreAPI/Endpoints/Subscribe:
    potential_errors:
      - CoreAPI/Errors/AccountSuspendedForReview
      - CoreAPI/Errors/BillingDetailsAreMissing
      - CoreAPI/Errors/YearlyQuotaIsExhausted
      - CoreAPI/Errors/ZoneIsNotAvailableHere
  CoreAPI/Endpoints/Charge:
    potential_errors:
      - CoreAPI/Errors/AccountSuspendedForReview
      - CoreAPI/Errors/CardWasDeclinedByIssuer
      - CoreAPI/Errors/YearlyQuotaIsExhausted
      - CoreAPI/Errors/ZoneIsNotAvailableHere
routes:
  - { method: post, path: subscribe, endpoint: CoreAPI/Endpoints/Subscribe }
  - { method: post, path: charge, endpoint: CoreAPI/Endpoints/Charge }
"#,
    )
    .unwrap();
    let doc = build_document(&api, BASE_URL, None, &SynthesisOptions::default()).unwrap();
    let group = "AccountSuspendedForReviewYearlyQuotaIsExhaustedZoneIsNotAvailableHere";

    assert_eq!(
        doc["paths"]["/subscribe"]["post"]["responses"]["400"],
        json!({ "$ref": format!("#/components/responses/{}Response", group) })
    );
    assert_eq!(
        doc["paths"]["/charge"]["post"]["responses"]["400"],
        json!({ "$ref": format!("#/components/responses/{}_2Response", group) })
    );

    let codes = |id: &str| -> Vec<Value> {
        doc["components"]["schemas"][id]["oneOf"]
            .as_array()
            .unwrap()
            .iter()
            .map(|envelope| envelope["properties"]["code"]["enum"][0].clone())
            .collect()
    };
    assert_eq!(
        codes(group),
        vec![
            json!("account_suspended"),
            json!("billing_missing"),
            json!("quota_exhausted"),
            json!("zone_unavailable"),
        ]
    );
    assert_eq!(
        codes(&format!("{}_2", group)),
        vec![
            json!("account_suspended"),
            json!("card_declined"),
            json!("quota_exhausted"),
            json!("zone_unavailable"),
        ]
    );
}

#[test]
fn test_duplicate_route_replaces_earlier_operation() {
    let api = ApiDefinition::from_yaml(
        r#"
id: CoreAPI/Base
endpoints:
  CoreAPI/Endpoints/TimeNow:
    name: Time Now
  CoreAPI/Endpoints/TimeNowV2:
    name: Time Now Again
routes:
  - { method: get, path: time/now, endpoint: CoreAPI/Endpoints/TimeNow }
  - { method: get, path: time/now, endpoint: CoreAPI/Endpoints/TimeNowV2 }
"#,
    )
    .unwrap();
    let doc = build_document(&api, BASE_URL, None, &SynthesisOptions::default()).unwrap();

    assert_eq!(keys(&doc["paths"]), vec!["/time/now"]);
    assert_eq!(keys(&doc["paths"]["/time/now"]), vec!["get"]);
    assert_eq!(doc["paths"]["/time/now"]["get"]["summary"], json!("Time Now Again"));
}

#[test]
fn test_bare_polymorph_inside_partial_uses_full_component() {
    let yaml = CORE_API.replace(
        "include: \"unix,year[as_string],as_array_of_objects[as_integer]\"",
        "include: \"unix,month\"",
    );
    let api = ApiDefinition::from_yaml(&yaml).unwrap();
    let doc = build_document(&api, BASE_URL, None, &SynthesisOptions::default()).unwrap();
    let schemas = &doc["components"]["schemas"];

    let partial = &schemas["PostExampleFormatMultiple200ResponseTimes"];
    assert_eq!(keys(&partial["properties"]), vec!["unix", "month"]);
    assert_eq!(
        partial["properties"]["month"],
        json!({ "$ref": "#/components/schemas/MonthPolymorph" })
    );
    assert_eq!(
        schemas["MonthPolymorph"]["properties"]["month"]["oneOf"],
        json!([
            { "$ref": "#/components/schemas/MonthLong" },
            { "$ref": "#/components/schemas/MonthShort" }
        ])
    );
}
