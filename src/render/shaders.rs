//! GLSL sources for the programs in [`super::Program`].
//!
//! Every vertex shader takes the position at attribute location 0 and the
//! `model`, `view` and `projection` uniforms; positions are never perturbed,
//! so all programs rasterize the same geometry to the same depth.

/// Vertex and fragment stages of one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

const BASIC_VERT: &str = r"#version 330 core
layout (location = 0) in vec3 a_position;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

void main()
{
    gl_Position = projection * view * model * vec4(a_position, 1.0);
}
";

const SOLID_FRAG: &str = r"#version 330 core
uniform vec4 color;
out vec4 frag_color;

void main()
{
    frag_color = color;
}
";

const ROUND_POINT_FRAG: &str = r"#version 330 core
uniform vec4 color;
out vec4 frag_color;

void main()
{
    vec2 offset = gl_PointCoord - vec2(0.5);
    if (dot(offset, offset) > 0.25)
        discard;
    frag_color = color;
}
";

// Index 0 is reserved for the background, so ids are written biased by one.
const VERTEX_ID_VERT: &str = r"#version 330 core
layout (location = 0) in vec3 a_position;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

flat out int v_id;

void main()
{
    gl_Position = projection * view * model * vec4(a_position, 1.0);
    v_id = gl_VertexID + 1;
}
";

const VERTEX_ID_FRAG: &str = r"#version 330 core
flat in int v_id;
out vec4 frag_color;

void main()
{
    frag_color = vec4(
        float(v_id & 0xFF) / 255.0,
        float((v_id >> 8) & 0xFF) / 255.0,
        float((v_id >> 16) & 0xFF) / 255.0,
        1.0);
}
";

const PHONG_VERT: &str = r"#version 330 core
layout (location = 0) in vec3 a_position;
layout (location = 1) in vec3 a_normal;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

out vec3 v_world_position;
out vec3 v_normal;

void main()
{
    vec4 world = model * vec4(a_position, 1.0);
    v_world_position = world.xyz;
    v_normal = mat3(transpose(inverse(model))) * a_normal;
    gl_Position = projection * view * world;
}
";

const PHONG_FRAG: &str = r"#version 330 core
in vec3 v_world_position;
in vec3 v_normal;

uniform vec4 color;
uniform vec3 light_pos;
uniform vec3 light_color;
uniform vec3 view_pos;

out vec4 frag_color;

void main()
{
    vec3 n = normalize(v_normal);
    vec3 l = normalize(light_pos - v_world_position);
    vec3 v = normalize(view_pos - v_world_position);
    vec3 r = reflect(-l, n);

    vec3 ambient = 0.15 * light_color;
    vec3 diffuse = abs(dot(n, l)) * light_color;
    vec3 specular = 0.4 * pow(max(dot(v, r), 0.0), 32.0) * light_color;

    frag_color = vec4((ambient + diffuse + specular) * color.rgb, color.a);
}
";

pub const SOLID: ShaderSources = ShaderSources {
    vertex: BASIC_VERT,
    fragment: SOLID_FRAG,
};

pub const ROUND_POINT: ShaderSources = ShaderSources {
    vertex: BASIC_VERT,
    fragment: ROUND_POINT_FRAG,
};

pub const VERTEX_ID: ShaderSources = ShaderSources {
    vertex: VERTEX_ID_VERT,
    fragment: VERTEX_ID_FRAG,
};

pub const PHONG: ShaderSources = ShaderSources {
    vertex: PHONG_VERT,
    fragment: PHONG_FRAG,
};
